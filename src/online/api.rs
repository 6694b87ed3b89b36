//! Response schema of the full user statistics endpoint.

use crate::models::stats::JudgementCounts;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteModeTotals {
    #[serde(default)]
    pub ranked_score: i64,
    #[serde(default)]
    pub overall_accuracy: f64,
    #[serde(default)]
    pub overall_performance_rating: f64,
    #[serde(default)]
    pub play_count: i32,
    #[serde(default)]
    pub fail_count: i32,
    #[serde(default)]
    pub max_combo: i32,
    #[serde(default)]
    pub total_marv: u32,
    #[serde(default)]
    pub total_perf: u32,
    #[serde(default)]
    pub total_great: u32,
    #[serde(default)]
    pub total_good: u32,
    #[serde(default)]
    pub total_okay: u32,
    #[serde(default)]
    pub total_miss: u32,
}

impl RemoteModeTotals {
    /// Lifetime judgement totals, best to worst.
    pub fn judgement_counts(&self) -> JudgementCounts {
        JudgementCounts::from_array([
            self.total_marv,
            self.total_perf,
            self.total_great,
            self.total_good,
            self.total_okay,
            self.total_miss,
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteModeStats {
    #[serde(default)]
    pub global_rank: i32,
    #[serde(default)]
    pub country_rank: i32,
    #[serde(default)]
    pub stats: RemoteModeTotals,
}

/// Per-mode sections of the snapshot. A mode the server does not report is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    #[serde(default)]
    pub keys4: Option<RemoteModeStats>,
    #[serde(default)]
    pub keys7: Option<RemoteModeStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUserSnapshot {
    pub status: u16,
    pub user: RemoteUser,
}
