//! Time-gated HUD readouts.
//!
//! Consumers poll every frame; [`ThrottledProjection`] only recomputes the
//! derived value once its interval has elapsed and otherwise hands back the
//! cached one.

pub mod judgement_counter;
pub mod song_time;

pub use judgement_counter::{JudgementCounterReadout, judgement_counter_projection};
pub use song_time::{SongClock, SongTimeReadout, song_time_projection};

use std::marker::PhantomData;

/// Recompute interval used by the gameplay HUD.
pub const DEFAULT_PROJECTION_INTERVAL_MS: f64 = 1000.0;

/// Caches `compute(state)` for at least `interval_ms` of clock time.
pub struct ThrottledProjection<S: ?Sized, T, F> {
    interval_ms: f64,
    compute: F,
    cached: Option<(f64, T)>,
    _state: PhantomData<fn(&S)>,
}

impl<S: ?Sized, T, F> ThrottledProjection<S, T, F>
where
    F: FnMut(&S) -> T,
{
    pub fn new(interval_ms: f64, compute: F) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            compute,
            cached: None,
            _state: PhantomData,
        }
    }

    /// Returns the projected value and whether it was recomputed.
    ///
    /// The first call always computes. Afterwards a new value is computed
    /// once `now_ms` is at least `interval_ms` away from the last
    /// recomputation, in either direction, so seeking backwards refreshes
    /// immediately.
    pub fn maybe_project(&mut self, now_ms: f64, state: &S) -> (&T, bool) {
        let (at, value, recomputed) = match self.cached.take() {
            Some((at, value)) if (now_ms - at).abs() < self.interval_ms => (at, value, false),
            _ => (now_ms, (self.compute)(state), true),
        };
        let cached = self.cached.insert((at, value));
        (&cached.1, recomputed)
    }

    /// Last projected value, if any.
    pub fn value(&self) -> Option<&T> {
        self.cached.as_ref().map(|(_, value)| value)
    }

    /// Forces the next call to recompute.
    pub fn reset(&mut self) {
        self.cached = None;
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_cached_within_interval() {
        let calls = Cell::new(0);
        let mut projection = ThrottledProjection::new(1000.0, |x: &i32| {
            calls.set(calls.get() + 1);
            x * 2
        });

        assert_eq!(projection.maybe_project(0.0, &1), (&2, true));
        assert_eq!(projection.maybe_project(999.9, &5), (&2, false));
        assert_eq!(projection.maybe_project(500.0, &7), (&2, false));
        assert_eq!(calls.get(), 1);

        assert_eq!(projection.maybe_project(1000.0, &5), (&10, true));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_rewind_recomputes() {
        let mut projection = ThrottledProjection::new(1000.0, |x: &i32| *x);
        projection.maybe_project(5000.0, &1);
        assert_eq!(projection.maybe_project(0.0, &2), (&2, true));
    }

    #[test]
    fn test_reset_and_zero_interval() {
        let mut projection = ThrottledProjection::new(1000.0, |x: &i32| *x);
        assert!(projection.value().is_none());
        projection.maybe_project(0.0, &1);
        projection.reset();
        assert_eq!(projection.maybe_project(1.0, &3), (&3, true));

        let mut every_frame = ThrottledProjection::new(0.0, |x: &i32| *x);
        every_frame.maybe_project(0.0, &1);
        assert_eq!(every_frame.maybe_project(0.0, &2), (&2, true));
    }
}
