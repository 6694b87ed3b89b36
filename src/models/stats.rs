//! Judgement categories and fixed-size judgement counters.
//!
//! This module defines the judgement system used for scoring, the
//! per-category counters shared by lifetime statistics and live sessions,
//! and the accuracy calculation derived from them.

use serde::{Deserialize, Serialize};

/// Hit judgement types from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Judgement {
    /// Perfect timing (best).
    Marv,
    /// Excellent timing.
    Perfect,
    /// Good timing.
    Great,
    /// Acceptable timing.
    Good,
    /// Poor timing.
    Bad,
    /// Missed note.
    Miss,
}

impl Judgement {
    /// Number of judgement categories.
    pub const COUNT: usize = 6;

    /// Every category in display order (best to worst).
    pub const ALL: [Judgement; Judgement::COUNT] = [
        Judgement::Marv,
        Judgement::Perfect,
        Judgement::Great,
        Judgement::Good,
        Judgement::Bad,
        Judgement::Miss,
    ];

    /// Position of this category inside fixed-size counters.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Accuracy weight out of 6 points.
    ///
    /// - Marv/Perfect: 100% weight (6 points)
    /// - Great: 66.7% weight (4 points)
    /// - Good: 33.3% weight (2 points)
    /// - Bad: 16.7% weight (1 point)
    /// - Miss: 0% weight (0 points)
    pub const fn weight(self) -> u32 {
        match self {
            Judgement::Marv | Judgement::Perfect => 6,
            Judgement::Great => 4,
            Judgement::Good => 2,
            Judgement::Bad => 1,
            Judgement::Miss => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Judgement::Marv => "Marv",
            Judgement::Perfect => "Perfect",
            Judgement::Great => "Great",
            Judgement::Good => "Good",
            Judgement::Bad => "Bad",
            Judgement::Miss => "Miss",
        }
    }
}

/// Count per judgement category, indexed by [`Judgement::index`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgementCounts([u32; Judgement::COUNT]);

impl JudgementCounts {
    /// Creates zeroed counters.
    pub const fn new() -> Self {
        Self([0; Judgement::COUNT])
    }

    /// Builds counters from values listed best to worst.
    pub const fn from_array(counts: [u32; Judgement::COUNT]) -> Self {
        Self(counts)
    }

    #[inline]
    pub fn get(&self, judgement: Judgement) -> u32 {
        self.0[judgement.index()]
    }

    #[inline]
    pub fn set(&mut self, judgement: Judgement, count: u32) {
        self.0[judgement.index()] = count;
    }

    /// Adds `amount` to a category, saturating at `u32::MAX`.
    pub fn add(&mut self, judgement: Judgement, amount: u32) {
        let slot = &mut self.0[judgement.index()];
        *slot = slot.saturating_add(amount);
    }

    /// Adds every category of `other` into `self`.
    pub fn merge(&mut self, other: &JudgementCounts) {
        for judgement in Judgement::ALL {
            self.add(judgement, other.get(judgement));
        }
    }

    /// Total number of judged events.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&c| c as u64).sum()
    }

    /// Iterates `(category, count)` pairs best to worst.
    pub fn iter(&self) -> impl Iterator<Item = (Judgement, u32)> + '_ {
        Judgement::ALL.into_iter().map(|j| (j, self.get(j)))
    }

    pub fn as_array(&self) -> [u32; Judgement::COUNT] {
        self.0
    }

    /// Calculates accuracy percentage (0-100) using [`Judgement::weight`].
    pub fn accuracy(&self) -> f64 {
        let total = self.total() as f64;

        if total == 0.0 {
            return 0.0;
        }

        let score: f64 = self
            .iter()
            .map(|(j, count)| count as f64 * j.weight() as f64)
            .sum();

        (score / (total * 6.0)) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_display_order() {
        for (i, judgement) in Judgement::ALL.iter().enumerate() {
            assert_eq!(judgement.index(), i);
        }
    }

    #[test]
    fn test_accuracy_weights() {
        assert_eq!(JudgementCounts::new().accuracy(), 0.0);

        let all_marv = JudgementCounts::from_array([10, 0, 0, 0, 0, 0]);
        assert!((all_marv.accuracy() - 100.0).abs() < 1e-9);

        // 6 + 4 + 0 over 3 * 6
        let mixed = JudgementCounts::from_array([1, 0, 1, 0, 0, 1]);
        assert!((mixed.accuracy() - (10.0 / 18.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_add_saturates() {
        let mut counts = JudgementCounts::new();
        counts.set(Judgement::Miss, u32::MAX - 1);
        counts.add(Judgement::Miss, 5);
        assert_eq!(counts.get(Judgement::Miss), u32::MAX);
    }

    #[test]
    fn test_merge_and_total() {
        let mut a = JudgementCounts::from_array([1, 2, 3, 0, 0, 1]);
        let b = JudgementCounts::from_array([1, 0, 0, 4, 0, 0]);
        a.merge(&b);
        assert_eq!(a.as_array(), [2, 2, 3, 4, 0, 1]);
        assert_eq!(a.total(), 12);
    }
}
