//! Judgement counter overlay readout.

use super::ThrottledProjection;
use crate::models::settings::DisplayConfig;
use crate::models::stats::{Judgement, JudgementCounts};
use crate::session::JudgementTally;

#[derive(Debug, Clone, PartialEq)]
pub struct JudgementCounterReadout {
    pub counts: JudgementCounts,
    pub accuracy: f64,
}

impl JudgementCounterReadout {
    pub fn count(&self, judgement: Judgement) -> u32 {
        self.counts.get(judgement)
    }

    /// Per-category increase since `previous`.
    pub fn delta(&self, previous: &JudgementCounts) -> JudgementCounts {
        JudgementCounts::from_array(std::array::from_fn(|i| {
            let judgement = Judgement::ALL[i];
            self.counts.get(judgement).saturating_sub(previous.get(judgement))
        }))
    }

    /// `(category, label)` pairs best to worst, e.g. `(Marv, "Marv 12")`.
    pub fn labels(&self) -> Vec<(Judgement, String)> {
        self.counts
            .iter()
            .map(|(judgement, count)| (judgement, format!("{} {}", judgement.name(), count)))
            .collect()
    }
}

pub fn project_judgement_counter(tally: &JudgementTally) -> JudgementCounterReadout {
    let counts = tally.snapshot();
    JudgementCounterReadout {
        counts,
        accuracy: counts.accuracy(),
    }
}

pub type JudgementCounterProjection = ThrottledProjection<
    JudgementTally,
    JudgementCounterReadout,
    fn(&JudgementTally) -> JudgementCounterReadout,
>;

pub fn judgement_counter_projection(config: &DisplayConfig) -> JudgementCounterProjection {
    ThrottledProjection::new(
        config.projection_interval_ms,
        project_judgement_counter as fn(&JudgementTally) -> JudgementCounterReadout,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readout_follows_tally() {
        let tally = JudgementTally::new();
        let config = DisplayConfig {
            projection_interval_ms: 100.0,
        };
        let mut projection = judgement_counter_projection(&config);

        tally.record(Judgement::Marv);
        let (readout, _) = projection.maybe_project(0.0, &tally);
        assert_eq!(readout.count(Judgement::Marv), 1);
        let previous = readout.counts;

        tally.record(Judgement::Marv);
        tally.record(Judgement::Miss);

        let (readout, recomputed) = projection.maybe_project(50.0, &tally);
        assert!(!recomputed);
        assert_eq!(readout.count(Judgement::Marv), 1);

        let (readout, recomputed) = projection.maybe_project(100.0, &tally);
        assert!(recomputed);
        assert_eq!(readout.delta(&previous).as_array(), [1, 0, 0, 0, 0, 1]);
        assert!((readout.accuracy - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_labels_in_display_order() {
        let tally = JudgementTally::new();
        tally.record(Judgement::Great);
        let readout = project_judgement_counter(&tally);
        let labels = readout.labels();

        assert_eq!(labels.len(), Judgement::COUNT);
        assert_eq!(labels[0], (Judgement::Marv, "Marv 0".to_string()));
        assert_eq!(labels[2], (Judgement::Great, "Great 1".to_string()));
    }
}
