//! Live judgement tally for the current play session.
//!
//! The scoring pipeline writes from the gameplay tick while HUD consumers
//! read from the render loop, possibly on another thread. Each category is a
//! single atomic, so readers never see a torn count.

use crate::models::mode::GameMode;
use crate::models::stats::{Judgement, JudgementCounts};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Session-scoped count per judgement category.
///
/// Counts never decrease while the tally lives: increments saturate and
/// [`JudgementTally::mirror`] only raises values.
#[derive(Debug, Default)]
pub struct JudgementTally {
    counts: [AtomicU32; Judgement::COUNT],
}

impl JudgementTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one resolved hit or miss.
    pub fn record(&self, judgement: Judgement) {
        let _ = self.counts[judgement.index()].fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |count| count.checked_add(1),
        );
    }

    /// Current count of a category. Cheap enough to call every frame.
    #[inline]
    pub fn count_of(&self, judgement: Judgement) -> u32 {
        self.counts[judgement.index()].load(Ordering::Relaxed)
    }

    /// Copies every category into plain counters.
    pub fn snapshot(&self) -> JudgementCounts {
        JudgementCounts::from_array(std::array::from_fn(|i| {
            self.counts[i].load(Ordering::Relaxed)
        }))
    }

    /// Raises each category to the pipeline's live count.
    ///
    /// Lower values are ignored so a stale pipeline read cannot roll the
    /// tally back.
    pub fn mirror(&self, live: &JudgementCounts) {
        for (judgement, count) in live.iter() {
            self.counts[judgement.index()].fetch_max(count, Ordering::Relaxed);
        }
    }

    pub fn total(&self) -> u64 {
        self.snapshot().total()
    }
}

/// Result of a finished session. The tally itself is gone by then.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub mode: GameMode,
    pub counts: JudgementCounts,
    pub accuracy: f64,
    pub duration_secs: f64,
}

/// One active play attempt owning its judgement tally.
pub struct PlaySession {
    mode: GameMode,
    tally: Arc<JudgementTally>,
    started_at: Instant,
}

impl PlaySession {
    pub fn start(mode: GameMode) -> Self {
        log::info!("SESSION: Started {} session", mode);
        Self {
            mode,
            tally: Arc::new(JudgementTally::new()),
            started_at: Instant::now(),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Write side, for the scoring pipeline.
    pub fn record(&self, judgement: Judgement) {
        self.tally.record(judgement);
    }

    /// Shared handle for display consumers and pipelines on other threads.
    pub fn tally(&self) -> Arc<JudgementTally> {
        Arc::clone(&self.tally)
    }

    /// Ends the session and discards the tally.
    ///
    /// The counts are not merged into any profile statistics; lifetime totals
    /// come back through the next reconciliation.
    pub fn finish(self) -> SessionSummary {
        let counts = self.tally.snapshot();
        let summary = SessionSummary {
            mode: self.mode,
            counts,
            accuracy: counts.accuracy(),
            duration_secs: self.started_at.elapsed().as_secs_f64(),
        };
        log::info!(
            "SESSION: Finished {} session, {} judgements, {:.2}% accuracy",
            summary.mode,
            counts.total(),
            summary.accuracy
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_record_and_count() {
        let tally = JudgementTally::new();
        for _ in 0..3 {
            tally.record(Judgement::Marv);
        }
        tally.record(Judgement::Miss);

        assert_eq!(tally.count_of(Judgement::Marv), 3);
        assert_eq!(tally.count_of(Judgement::Miss), 1);
        for judgement in [
            Judgement::Perfect,
            Judgement::Great,
            Judgement::Good,
            Judgement::Bad,
        ] {
            assert_eq!(tally.count_of(judgement), 0);
        }
        assert_eq!(tally.total(), 4);
    }

    #[test]
    fn test_counts_never_decrease() {
        let tally = JudgementTally::new();
        let sequence = [
            Judgement::Great,
            Judgement::Marv,
            Judgement::Great,
            Judgement::Miss,
            Judgement::Great,
            Judgement::Bad,
        ];

        let mut previous = tally.snapshot();
        for judgement in sequence {
            tally.record(judgement);
            let current = tally.snapshot();
            for j in Judgement::ALL {
                assert!(current.get(j) >= previous.get(j));
            }
            previous = current;
        }
    }

    #[test]
    fn test_mirror_only_raises() {
        let tally = JudgementTally::new();
        tally.record(Judgement::Good);
        tally.record(Judgement::Good);

        tally.mirror(&JudgementCounts::from_array([5, 0, 0, 1, 0, 2]));
        assert_eq!(tally.snapshot().as_array(), [5, 0, 0, 2, 0, 2]);

        tally.mirror(&JudgementCounts::new());
        assert_eq!(tally.snapshot().as_array(), [5, 0, 0, 2, 0, 2]);
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        let tally = JudgementTally::new();
        tally.mirror(&JudgementCounts::from_array([u32::MAX, 0, 0, 0, 0, 0]));
        tally.record(Judgement::Marv);
        assert_eq!(tally.count_of(Judgement::Marv), u32::MAX);
    }

    #[test]
    fn test_concurrent_writer_and_reader() {
        let session = PlaySession::start(GameMode::Keys4);
        let writer_tally = session.tally();
        let reader_tally = session.tally();

        let writer = thread::spawn(move || {
            for i in 0..10_000 {
                let judgement = if i % 10 == 0 {
                    Judgement::Miss
                } else {
                    Judgement::Marv
                };
                writer_tally.record(judgement);
            }
        });

        let reader = thread::spawn(move || {
            let mut last = 0;
            for _ in 0..10_000 {
                let now = reader_tally.count_of(Judgement::Marv);
                assert!(now >= last);
                last = now;
            }
        });

        writer.join().unwrap();
        reader.join().unwrap();

        let summary = session.finish();
        assert_eq!(summary.counts.get(Judgement::Marv), 9_000);
        assert_eq!(summary.counts.get(Judgement::Miss), 1_000);
        assert!((summary.accuracy - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_sessions_do_not_share_counts() {
        let first = PlaySession::start(GameMode::Keys7);
        first.record(Judgement::Perfect);
        let summary = first.finish();
        assert_eq!(summary.counts.get(Judgement::Perfect), 1);

        let second = PlaySession::start(GameMode::Keys7);
        assert_eq!(second.tally().count_of(Judgement::Perfect), 0);
    }
}
