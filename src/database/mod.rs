//! Local statistics cache.
//!
//! The reconciliation layer only sees [`StatsBackend`], a keyed read/write
//! interface over `(profile id, mode)`. [`Database`] implements it on top of
//! SQLite.

pub mod connection;
pub mod models;
pub mod query;

pub use connection::Database;

use crate::models::mode::GameMode;
use crate::models::profile::{ModeStats, ScoreRecord};
use std::future::Future;

/// Failures of the persistence layer itself.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("unable to create database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Keyed access to cached per-mode statistics.
pub trait StatsBackend: Send + Sync {
    /// Reads the cached record for a mode, without score history.
    fn load_mode_stats(
        &self,
        profile_id: i64,
        mode: GameMode,
    ) -> impl Future<Output = Result<Option<ModeStats>, StoreError>> + Send;

    /// Reads the score history for a mode, newest first.
    fn load_scores(
        &self,
        profile_id: i64,
        mode: GameMode,
    ) -> impl Future<Output = Result<Vec<ScoreRecord>, StoreError>> + Send;

    /// Writes a record through to the cache.
    fn save_mode_stats(
        &self,
        profile_id: i64,
        stats: &ModeStats,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
