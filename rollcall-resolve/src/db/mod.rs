//! Database access for name resolution
//!
//! Tables owned by this crate sit alongside the shared roster and
//! assignment tables created by rollcall-common. Call `init_tables`
//! once at startup after `rollcall_common::db::init_database`.

pub mod assignments;
pub mod decisions;
pub mod mappings;
pub mod roster;
pub mod settings;
pub mod unmatched;

use rollcall_common::Result;
use sqlx::SqlitePool;

/// Create the resolution-specific tables if they don't exist
///
/// Idempotent, safe to call on every startup.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    // Cache of automatic matches, keyed by the raw counselor string
    // exactly as it appears in imported reports
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS counselor_mappings (
            raw_name TEXT PRIMARY KEY,
            counselor_id TEXT NOT NULL REFERENCES roster_members(guid),
            confidence REAL NOT NULL CHECK (confidence >= 0.0 AND confidence <= 1.0),
            strategy TEXT NOT NULL,
            created_by TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Review queue. Rows are never deleted; resolution_status flips
    // instead so occurrence history survives resolution.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS unmatched_counselors (
            raw_name TEXT PRIMARY KEY,
            occurrence_count INTEGER NOT NULL DEFAULT 1,
            candidates TEXT NOT NULL DEFAULT '[]',
            resolution_status TEXT NOT NULL DEFAULT 'unresolved'
                CHECK (resolution_status IN ('unresolved', 'manually_matched', 'skipped', 'marked_invalid', 'new_record_needed')),
            resolved_counselor_id TEXT REFERENCES roster_members(guid),
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_unmatched_counselors_status ON unmatched_counselors(resolution_status)",
    )
    .execute(pool)
    .await?;

    // Append-only audit log of manual decisions. An undo is itself a
    // row whose supersedes column points at the decision it reverses.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resolution_decisions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            raw_name TEXT NOT NULL,
            action TEXT NOT NULL
                CHECK (action IN ('matched', 'skipped', 'marked_invalid', 'new_record_needed', 'undone')),
            counselor_id TEXT REFERENCES roster_members(guid),
            confidence REAL CHECK (confidence IS NULL OR (confidence >= 0.0 AND confidence <= 1.0)),
            decided_by TEXT NOT NULL,
            notes TEXT,
            supersedes INTEGER REFERENCES resolution_decisions(id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_resolution_decisions_raw_name ON resolution_decisions(raw_name)",
    )
    .execute(pool)
    .await?;

    tracing::info!(
        "Resolution tables initialized (counselor_mappings, unmatched_counselors, resolution_decisions)"
    );

    Ok(())
}
