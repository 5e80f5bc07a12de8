//! Shared utilities for integration tests

use anyhow::Result;
use rollcall_resolve::db::assignments::{self, BadgeAssignment};
use rollcall_resolve::db::roster::{self, RosterMember};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

/// Create a temporary database with the full production schema
///
/// Returns (TempDir, SqlitePool); the TempDir must stay alive for the
/// duration of the test.
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("rollcall.db");

    let pool = rollcall_common::db::init_database(&db_path).await?;
    rollcall_resolve::db::init_tables(&pool).await?;

    Ok((temp_dir, pool))
}

/// Insert a roster member, returning its id
pub async fn seed_member(pool: &SqlitePool, given: &str, family: &str) -> Result<Uuid> {
    let member = RosterMember::new(given.to_string(), family.to_string());
    roster::save_member(pool, &member).await?;
    Ok(member.guid)
}

/// Insert an unresolved assignment row carrying a raw counselor cell
pub async fn seed_assignment(pool: &SqlitePool, counselor_raw: Option<&str>) -> Result<Uuid> {
    let assignment = BadgeAssignment::new(
        "Tim Scout".to_string(),
        "First Aid".to_string(),
        counselor_raw.map(|s| s.to_string()),
    );
    assignments::save_assignment(pool, &assignment).await?;
    Ok(assignment.guid)
}

/// Initialize tracing for test output
///
/// Safe to call from every test; only the first call installs the
/// subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall_resolve=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
