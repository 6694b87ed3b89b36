use crate::database::models::{ProfileRow, ProfileStatsRow};
use crate::database::{StatsBackend, StoreError, query};
use crate::models::mode::GameMode;
use crate::models::profile::{ModeStats, Profile, ScoreRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens or creates the database file.
    pub async fn new(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let absolute_path = if db_path.is_absolute() {
            db_path.to_path_buf()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(db_path)
        };
        log::info!("DB: Opening statistics cache at {:?}", absolute_path);

        let options = SqliteConnectOptions::new()
            .filename(&absolute_path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await?;
        let db = Database { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Opens a private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` gets its own database, so the
    /// pool is pinned to a single connection.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let db = Database { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS profile (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE
            )",
        )
        .execute(&self.pool)
        .await?;

        // One row per (profile, mode); mode is the key count.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS profile_stats (
                profile_id INTEGER NOT NULL,
                mode INTEGER NOT NULL,
                global_rank INTEGER NOT NULL DEFAULT 0,
                country_rank INTEGER NOT NULL DEFAULT 0,
                overall_rating REAL NOT NULL DEFAULT 0,
                overall_accuracy REAL NOT NULL DEFAULT 0,
                total_score INTEGER NOT NULL DEFAULT 0,
                max_combo INTEGER NOT NULL DEFAULT 0,
                play_count INTEGER NOT NULL DEFAULT 0,
                fail_count INTEGER NOT NULL DEFAULT 0,
                count_marv INTEGER NOT NULL DEFAULT 0,
                count_perfect INTEGER NOT NULL DEFAULT 0,
                count_great INTEGER NOT NULL DEFAULT 0,
                count_good INTEGER NOT NULL DEFAULT 0,
                count_bad INTEGER NOT NULL DEFAULT 0,
                count_miss INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (profile_id, mode),
                FOREIGN KEY (profile_id) REFERENCES profile(id) ON DELETE CASCADE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS score (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER NOT NULL,
                mode INTEGER NOT NULL,
                map_hash TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                score INTEGER NOT NULL,
                accuracy REAL NOT NULL,
                max_combo INTEGER NOT NULL,
                rate REAL NOT NULL DEFAULT 1.0,
                failed INTEGER NOT NULL DEFAULT 0,
                count_marv INTEGER NOT NULL DEFAULT 0,
                count_perfect INTEGER NOT NULL DEFAULT 0,
                count_great INTEGER NOT NULL DEFAULT 0,
                count_good INTEGER NOT NULL DEFAULT 0,
                count_bad INTEGER NOT NULL DEFAULT 0,
                count_miss INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (profile_id) REFERENCES profile(id) ON DELETE CASCADE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_score_profile_mode ON score (profile_id, mode)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates a local profile, or returns the existing one with that name.
    pub async fn create_profile(&self, username: &str) -> Result<Profile, StoreError> {
        let id = query::upsert_profile(&self.pool, username).await?;
        Ok(Profile::new(id, username))
    }

    /// Looks a profile up by id. Statistics are populated by reconciliation.
    pub async fn load_profile(&self, id: i64) -> Result<Option<Profile>, StoreError> {
        let row = query::get_profile(&self.pool, id).await?;
        Ok(row.map(|ProfileRow { id, username }| Profile::new(id, &username)))
    }

    pub async fn load_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let rows = query::get_all_profiles(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| Profile::new(row.id, &row.username))
            .collect())
    }

    /// Stores a finished play in the score history.
    pub async fn insert_score(
        &self,
        profile_id: i64,
        score: &ScoreRecord,
    ) -> Result<i64, StoreError> {
        Ok(query::insert_score(&self.pool, profile_id, score).await?)
    }
}

impl StatsBackend for Database {
    async fn load_mode_stats(
        &self,
        profile_id: i64,
        mode: GameMode,
    ) -> Result<Option<ModeStats>, StoreError> {
        let row = query::get_profile_stats(&self.pool, profile_id, mode.key_count() as i64).await?;
        Ok(row.map(ProfileStatsRow::into_stats))
    }

    async fn load_scores(
        &self,
        profile_id: i64,
        mode: GameMode,
    ) -> Result<Vec<ScoreRecord>, StoreError> {
        let rows = query::get_scores(&self.pool, profile_id, mode.key_count() as i64).await?;
        Ok(rows.into_iter().map(ScoreRecord::from).collect())
    }

    async fn save_mode_stats(&self, profile_id: i64, stats: &ModeStats) -> Result<(), StoreError> {
        let row = ProfileStatsRow::from_stats(profile_id, stats, chrono::Utc::now().timestamp());
        query::upsert_profile_stats(&self.pool, &row).await?;
        Ok(())
    }
}
