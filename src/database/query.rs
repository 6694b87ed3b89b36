//! Raw sqlx query helpers for the local statistics cache.

use crate::database::models::{ProfileRow, ProfileStatsRow, ScoreRow};
use crate::models::profile::ScoreRecord;
use sqlx::SqlitePool;

const PROFILE_STATS_COLUMNS: &str = "profile_id, mode, global_rank, country_rank, overall_rating, overall_accuracy, total_score, max_combo, play_count, fail_count, count_marv, count_perfect, count_great, count_good, count_bad, count_miss, updated_at";

const SCORE_COLUMNS: &str = "id, profile_id, mode, map_hash, timestamp, score, accuracy, max_combo, rate, failed, count_marv, count_perfect, count_great, count_good, count_bad, count_miss";

/// Inserts a profile, or returns the id of the existing one with that name.
pub async fn upsert_profile(pool: &SqlitePool, username: &str) -> Result<i64, sqlx::Error> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM profile WHERE username = ?1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    match existing {
        Some(id) => Ok(id),
        None => {
            let result = sqlx::query("INSERT INTO profile (username) VALUES (?1)")
                .bind(username)
                .execute(pool)
                .await?;
            Ok(result.last_insert_rowid())
        }
    }
}

pub async fn get_profile(pool: &SqlitePool, id: i64) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as("SELECT id, username FROM profile WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_all_profiles(pool: &SqlitePool) -> Result<Vec<ProfileRow>, sqlx::Error> {
    sqlx::query_as("SELECT id, username FROM profile ORDER BY username")
        .fetch_all(pool)
        .await
}

/// Retrieves the cached statistics row for one (profile, mode) pair.
pub async fn get_profile_stats(
    pool: &SqlitePool,
    profile_id: i64,
    mode: i64,
) -> Result<Option<ProfileStatsRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM profile_stats WHERE profile_id = ?1 AND mode = ?2",
        PROFILE_STATS_COLUMNS
    );
    sqlx::query_as(&sql)
        .bind(profile_id)
        .bind(mode)
        .fetch_optional(pool)
        .await
}

/// Inserts or replaces the cached statistics row.
pub async fn upsert_profile_stats(
    pool: &SqlitePool,
    row: &ProfileStatsRow,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT OR REPLACE INTO profile_stats ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        PROFILE_STATS_COLUMNS
    );
    sqlx::query(&sql)
        .bind(row.profile_id)
        .bind(row.mode)
        .bind(row.global_rank)
        .bind(row.country_rank)
        .bind(row.overall_rating)
        .bind(row.overall_accuracy)
        .bind(row.total_score)
        .bind(row.max_combo)
        .bind(row.play_count)
        .bind(row.fail_count)
        .bind(row.count_marv)
        .bind(row.count_perfect)
        .bind(row.count_great)
        .bind(row.count_good)
        .bind(row.count_bad)
        .bind(row.count_miss)
        .bind(row.updated_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// Retrieves the score history of one (profile, mode) pair, newest first.
pub async fn get_scores(
    pool: &SqlitePool,
    profile_id: i64,
    mode: i64,
) -> Result<Vec<ScoreRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM score WHERE profile_id = ?1 AND mode = ?2 ORDER BY timestamp DESC, id DESC",
        SCORE_COLUMNS
    );
    sqlx::query_as(&sql)
        .bind(profile_id)
        .bind(mode)
        .fetch_all(pool)
        .await
}

/// Inserts a score record and returns its row id.
pub async fn insert_score(
    pool: &SqlitePool,
    profile_id: i64,
    score: &ScoreRecord,
) -> Result<i64, sqlx::Error> {
    let [marv, perfect, great, good, bad, miss] = score.judgement_counts.as_array();
    let result = sqlx::query(
        "INSERT INTO score (profile_id, mode, map_hash, timestamp, score, accuracy, max_combo, rate, failed, count_marv, count_perfect, count_great, count_good, count_bad, count_miss)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    )
    .bind(profile_id)
    .bind(score.mode.key_count() as i64)
    .bind(&score.map_hash)
    .bind(score.timestamp)
    .bind(score.score)
    .bind(score.accuracy)
    .bind(score.max_combo)
    .bind(score.rate)
    .bind(score.failed)
    .bind(marv as i64)
    .bind(perfect as i64)
    .bind(great as i64)
    .bind(good as i64)
    .bind(bad as i64)
    .bind(miss as i64)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}
