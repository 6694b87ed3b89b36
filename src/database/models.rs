//! Data structures mirroring the SQLite tables.

use crate::models::mode::GameMode;
use crate::models::profile::{ModeStats, ScoreRecord};
use crate::models::stats::JudgementCounts;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: i64,
    pub username: String,
}

/// Cached per-mode statistics, one row per (profile, mode).
#[derive(Debug, Clone, FromRow)]
pub struct ProfileStatsRow {
    pub profile_id: i64,
    pub mode: i64, // key count
    pub global_rank: i32,
    pub country_rank: i32,
    pub overall_rating: f64,
    pub overall_accuracy: f64,
    pub total_score: i64,
    pub max_combo: i32,
    pub play_count: i32,
    pub fail_count: i32,
    pub count_marv: i64,
    pub count_perfect: i64,
    pub count_great: i64,
    pub count_good: i64,
    pub count_bad: i64,
    pub count_miss: i64,
    pub updated_at: i64, // Unix timestamp of the last write
}

#[derive(Debug, Clone, FromRow)]
pub struct ScoreRow {
    pub id: i64,
    pub profile_id: i64,
    pub mode: i64,
    pub map_hash: String,
    pub timestamp: i64,
    pub score: i64,
    pub accuracy: f64,
    pub max_combo: i32,
    pub rate: f64, // Playback rate (1.0 = normal)
    pub failed: bool,
    pub count_marv: i64,
    pub count_perfect: i64,
    pub count_great: i64,
    pub count_good: i64,
    pub count_bad: i64,
    pub count_miss: i64,
}

fn clamp_count(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

fn counts_from_columns(columns: [i64; 6]) -> JudgementCounts {
    JudgementCounts::from_array(columns.map(clamp_count))
}

fn mode_from_column(mode: i64) -> GameMode {
    GameMode::from_key_count(u8::try_from(mode).unwrap_or(0))
}

impl ProfileStatsRow {
    pub fn from_stats(profile_id: i64, stats: &ModeStats, updated_at: i64) -> Self {
        let [marv, perfect, great, good, bad, miss] = stats.judgement_counts.as_array();
        Self {
            profile_id,
            mode: stats.mode.key_count() as i64,
            global_rank: stats.global_rank,
            country_rank: stats.country_rank,
            overall_rating: stats.overall_rating,
            overall_accuracy: stats.overall_accuracy,
            total_score: stats.total_score,
            max_combo: stats.max_combo,
            play_count: stats.play_count,
            fail_count: stats.fail_count,
            count_marv: marv as i64,
            count_perfect: perfect as i64,
            count_great: great as i64,
            count_good: good as i64,
            count_bad: bad as i64,
            count_miss: miss as i64,
            updated_at,
        }
    }

    /// Converts the row into a record without score history.
    pub fn into_stats(self) -> ModeStats {
        ModeStats {
            mode: mode_from_column(self.mode),
            global_rank: self.global_rank,
            country_rank: self.country_rank,
            overall_rating: self.overall_rating,
            overall_accuracy: self.overall_accuracy,
            total_score: self.total_score,
            max_combo: self.max_combo,
            play_count: self.play_count,
            fail_count: self.fail_count,
            scores: Vec::new(),
            judgement_counts: counts_from_columns([
                self.count_marv,
                self.count_perfect,
                self.count_great,
                self.count_good,
                self.count_bad,
                self.count_miss,
            ]),
        }
    }
}

impl From<ScoreRow> for ScoreRecord {
    fn from(row: ScoreRow) -> Self {
        Self {
            id: row.id,
            mode: mode_from_column(row.mode),
            map_hash: row.map_hash,
            timestamp: row.timestamp,
            score: row.score,
            accuracy: row.accuracy,
            max_combo: row.max_combo,
            rate: row.rate,
            failed: row.failed,
            judgement_counts: counts_from_columns([
                row.count_marv,
                row.count_perfect,
                row.count_great,
                row.count_good,
                row.count_bad,
                row.count_miss,
            ]),
        }
    }
}
