//! Settings database operations
//!
//! Get/set accessors over the shared settings table. Defaults are
//! seeded at startup by rollcall-common; the getters fall back to the
//! same defaults so a missing row never breaks resolution.

use crate::matching::engine::DEFAULT_MIN_CONFIDENCE;
use crate::services::import_gate::DEFAULT_AUTO_ACCEPT_THRESHOLD;
use rollcall_common::{Error, Result};
use sqlx::{Pool, Sqlite};

#[cfg(test)]
use sqlx::SqlitePool;

/// Candidates returned per review request when no limit is given
pub const DEFAULT_CANDIDATE_LIMIT: usize = 10;

/// Confidence at or above which the import gate links without review
pub async fn get_auto_accept_threshold(db: &Pool<Sqlite>) -> Result<f64> {
    get_setting(db, "auto_accept_threshold")
        .await
        .map(|opt| opt.unwrap_or(DEFAULT_AUTO_ACCEPT_THRESHOLD))
}

pub async fn set_auto_accept_threshold(db: &Pool<Sqlite>, threshold: f64) -> Result<()> {
    set_setting(db, "auto_accept_threshold", threshold).await
}

/// Floor below which fuzzy and phonetic hits are discarded
pub async fn get_min_match_confidence(db: &Pool<Sqlite>) -> Result<f64> {
    get_setting(db, "min_match_confidence")
        .await
        .map(|opt| opt.unwrap_or(DEFAULT_MIN_CONFIDENCE))
}

pub async fn set_min_match_confidence(db: &Pool<Sqlite>, floor: f64) -> Result<()> {
    set_setting(db, "min_match_confidence", floor).await
}

/// Maximum candidates surfaced per review request
pub async fn get_candidate_limit(db: &Pool<Sqlite>) -> Result<usize> {
    get_setting(db, "candidate_limit")
        .await
        .map(|opt| opt.unwrap_or(DEFAULT_CANDIDATE_LIMIT))
}

pub async fn set_candidate_limit(db: &Pool<Sqlite>, limit: usize) -> Result<()> {
    set_setting(db, "candidate_limit", limit).await
}

/// Generic setting getter (internal)
async fn get_setting<T>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await
        .map_err(Error::Database)?;

    match row {
        Some((value,)) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting failed: {}", e)))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Generic setting setter (internal)
async fn set_setting<T>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await
    .map_err(Error::Database)?;

    Ok(())
}
