//! Player profiles and their per-mode statistics.

use crate::database::{StatsBackend, StoreError};
use crate::models::mode::GameMode;
use crate::models::stats::JudgementCounts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A finished local play kept in the score history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: i64,
    pub mode: GameMode,
    pub map_hash: String,
    pub timestamp: i64, // Unix timestamp recorded at completion
    pub score: i64,
    pub accuracy: f64,
    pub max_combo: i32,
    pub rate: f64,
    pub failed: bool,
    pub judgement_counts: JudgementCounts,
}

impl ScoreRecord {
    pub fn new(mode: GameMode, map_hash: &str, timestamp: i64) -> Self {
        Self {
            id: 0,
            mode,
            map_hash: map_hash.to_string(),
            timestamp,
            score: 0,
            accuracy: 0.0,
            max_combo: 0,
            rate: 1.0,
            failed: false,
            judgement_counts: JudgementCounts::new(),
        }
    }
}

/// Statistics of one profile for one game mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeStats {
    pub mode: GameMode,
    pub global_rank: i32,
    pub country_rank: i32,
    pub overall_rating: f64,
    pub overall_accuracy: f64,
    /// Cumulative ranked score.
    pub total_score: i64,
    pub max_combo: i32,
    pub play_count: i32,
    pub fail_count: i32,
    /// Newest first. Empty after an online snapshot.
    pub scores: Vec<ScoreRecord>,
    /// Lifetime judgement totals.
    pub judgement_counts: JudgementCounts,
}

impl ModeStats {
    /// Zeroed record.
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            global_rank: 0,
            country_rank: 0,
            overall_rating: 0.0,
            overall_accuracy: 0.0,
            total_score: 0,
            max_combo: 0,
            play_count: 0,
            fail_count: 0,
            scores: Vec::new(),
            judgement_counts: JudgementCounts::new(),
        }
    }

    /// Rebuilds the local fields from the cached record and score history.
    ///
    /// A cached record is authoritative for the aggregate fields. Without one
    /// the aggregates are derived from the history so a profile that never
    /// synced still shows its local plays.
    pub fn apply_local(&mut self, cached: Option<ModeStats>, scores: Vec<ScoreRecord>) {
        match cached {
            Some(cached) => {
                let mode = self.mode;
                *self = ModeStats { mode, ..cached };
            }
            None => {
                *self = ModeStats::new(self.mode);
                self.derive_from_scores(&scores);
            }
        }
        self.scores = scores;
    }

    fn derive_from_scores(&mut self, scores: &[ScoreRecord]) {
        let passed: Vec<&ScoreRecord> = scores.iter().filter(|s| !s.failed).collect();

        self.play_count = scores.len().min(i32::MAX as usize) as i32;
        self.fail_count = (scores.len() - passed.len()).min(i32::MAX as usize) as i32;
        self.max_combo = scores.iter().map(|s| s.max_combo).max().unwrap_or(0);
        self.total_score = passed.iter().map(|s| s.score).sum();
        self.overall_accuracy = if passed.is_empty() {
            0.0
        } else {
            passed.iter().map(|s| s.accuracy).sum::<f64>() / passed.len() as f64
        };

        for score in scores {
            self.judgement_counts.merge(&score.judgement_counts);
        }
    }
}

/// Where the current statistics of a profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsSource {
    Local,
    Remote,
}

/// Last-updated marker consulted by callers that need fresh data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Freshness {
    pub source: StatsSource,
    pub at: DateTime<Utc>,
}

impl Freshness {
    pub fn now(source: StatsSource) -> Self {
        Self {
            source,
            at: Utc::now(),
        }
    }
}

/// Per-profile mapping from game mode to its statistics record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatKeyedStore {
    profile_id: i64,
    stats: BTreeMap<GameMode, ModeStats>,
}

impl StatKeyedStore {
    pub fn new(profile_id: i64) -> Self {
        Self {
            profile_id,
            stats: BTreeMap::new(),
        }
    }

    pub fn profile_id(&self) -> i64 {
        self.profile_id
    }

    pub fn get(&self, mode: GameMode) -> Option<&ModeStats> {
        self.stats.get(&mode)
    }

    pub fn get_mut(&mut self, mode: GameMode) -> Option<&mut ModeStats> {
        self.stats.get_mut(&mode)
    }

    pub fn contains(&self, mode: GameMode) -> bool {
        self.stats.contains_key(&mode)
    }

    /// Returns the record for `mode`, creating a zeroed one on first access.
    ///
    /// Repeated calls return the same record.
    pub fn ensure_created(&mut self, mode: GameMode) -> &mut ModeStats {
        self.stats
            .entry(mode)
            .or_insert_with(|| ModeStats::new(mode))
    }

    /// Re-reads the backing cache for `mode` and updates the record in place.
    ///
    /// A missing cached row leaves a record derived from the score history
    /// alone (zeroed when there is none).
    pub async fn refresh<B: StatsBackend>(
        &mut self,
        mode: GameMode,
        backend: &B,
    ) -> Result<(), StoreError> {
        let cached = backend.load_mode_stats(self.profile_id, mode).await?;
        let scores = backend.load_scores(self.profile_id, mode).await?;
        self.ensure_created(mode).apply_local(cached, scores);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GameMode, &ModeStats)> {
        self.stats.iter()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// A player, either the authenticated online self or a local/offline profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    /// Marks the authenticated online self.
    pub is_online: bool,
    pub stats: StatKeyedStore,
    pub last_updated: Option<Freshness>,
}

impl Profile {
    pub fn new(id: i64, username: &str) -> Self {
        Self {
            id,
            username: username.to_string(),
            is_online: false,
            stats: StatKeyedStore::new(id),
            last_updated: None,
        }
    }

    pub fn online(id: i64, username: &str) -> Self {
        Self {
            is_online: true,
            ..Self::new(id, username)
        }
    }

    /// True when the statistics were last replaced by a remote snapshot.
    pub fn is_fresh(&self) -> bool {
        matches!(
            self.last_updated,
            Some(Freshness {
                source: StatsSource::Remote,
                ..
            })
        )
    }
}
