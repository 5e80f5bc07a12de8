//! Unmatched counselor registry
//!
//! Durable review queue of raw counselor names the import gate could
//! not link automatically. Rows are never deleted; the resolution
//! status flips as humans work the queue, and occurrence counts keep
//! growing on re-import so reviewers see which names matter most.

use crate::matching::engine::MatchCandidate;
use rollcall_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::warn;
use uuid::Uuid;

/// Where a registry row sits in the review workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Unresolved,
    ManuallyMatched,
    Skipped,
    MarkedInvalid,
    NewRecordNeeded,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::Unresolved => "unresolved",
            ResolutionStatus::ManuallyMatched => "manually_matched",
            ResolutionStatus::Skipped => "skipped",
            ResolutionStatus::MarkedInvalid => "marked_invalid",
            ResolutionStatus::NewRecordNeeded => "new_record_needed",
        }
    }
}

impl std::str::FromStr for ResolutionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "unresolved" => Ok(ResolutionStatus::Unresolved),
            "manually_matched" => Ok(ResolutionStatus::ManuallyMatched),
            "skipped" => Ok(ResolutionStatus::Skipped),
            "marked_invalid" => Ok(ResolutionStatus::MarkedInvalid),
            "new_record_needed" => Ok(ResolutionStatus::NewRecordNeeded),
            other => Err(format!("Unknown resolution status: {}", other)),
        }
    }
}

/// One raw counselor name awaiting (or through) human review
#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedRecord {
    pub raw_name: String,
    pub occurrence_count: i64,
    /// Candidate snapshot from the most recent import, possibly stale
    pub candidates: Vec<MatchCandidate>,
    pub resolution_status: ResolutionStatus,
    pub resolved_counselor_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Register an unmatched raw name, or bump its occurrence count
///
/// First sighting inserts with occurrence_count 1; recurrence
/// increments the count and overwrites the candidate snapshot, leaving
/// the resolution status untouched.
pub async fn upsert_unmatched(
    pool: &SqlitePool,
    raw_name: &str,
    candidates: &[MatchCandidate],
) -> Result<()> {
    let snapshot = serde_json::to_string(candidates)
        .map_err(|e| Error::Internal(format!("Failed to serialize candidate snapshot: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO unmatched_counselors (raw_name, occurrence_count, candidates)
        VALUES (?, 1, ?)
        ON CONFLICT(raw_name) DO UPDATE SET
            occurrence_count = occurrence_count + 1,
            candidates = excluded.candidates,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(raw_name)
    .bind(snapshot)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load one registry row by raw name
pub async fn load_unmatched(pool: &SqlitePool, raw_name: &str) -> Result<Option<UnmatchedRecord>> {
    let row = sqlx::query(
        r#"
        SELECT raw_name, occurrence_count, candidates, resolution_status,
               resolved_counselor_id, notes, created_at, updated_at
        FROM unmatched_counselors
        WHERE raw_name = ?
        "#,
    )
    .bind(raw_name)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(row_to_record(&row)?)),
        None => Ok(None),
    }
}

/// All rows still awaiting review, busiest names first
pub async fn list_unresolved(pool: &SqlitePool) -> Result<Vec<UnmatchedRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT raw_name, occurrence_count, candidates, resolution_status,
               resolved_counselor_id, notes, created_at, updated_at
        FROM unmatched_counselors
        WHERE resolution_status = 'unresolved'
        ORDER BY occurrence_count DESC, raw_name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<UnmatchedRecord> {
    let raw_name: String = row.get("raw_name");
    let snapshot: String = row.get("candidates");
    let status_str: String = row.get("resolution_status");
    let resolved_str: Option<String> = row.get("resolved_counselor_id");

    // A garbled snapshot degrades to an empty list; candidates can
    // always be re-scored against the live roster
    let candidates = serde_json::from_str(&snapshot).unwrap_or_else(|e| {
        warn!(
            raw_name = %raw_name,
            error = %e,
            "Corrupt candidate snapshot, treating as empty"
        );
        Vec::new()
    });

    let resolved_counselor_id = match resolved_str {
        Some(s) => Some(
            Uuid::parse_str(&s)
                .map_err(|e| Error::Internal(format!("Invalid resolved counselor id: {}", e)))?,
        ),
        None => None,
    };

    Ok(UnmatchedRecord {
        raw_name,
        occurrence_count: row.get("occurrence_count"),
        candidates,
        resolution_status: status_str.parse().map_err(Error::Internal)?,
        resolved_counselor_id,
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scorer::MatchStrategy;

    async fn setup_test_db() -> SqlitePool {
        use std::str::FromStr;

        // These fixtures skip the shared roster tables and use opaque
        // member ids, so foreign keys stay unenforced.
        let options = sqlx::sqlite::SqliteConnectOptions::from_str(":memory:")
            .unwrap()
            .foreign_keys(false);
        let pool = SqlitePool::connect_with(options).await.unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        pool
    }

    fn candidate(confidence: f64) -> MatchCandidate {
        MatchCandidate {
            member_id: Uuid::new_v4(),
            member_name: "Robert Smith".to_string(),
            confidence,
            strategy: MatchStrategy::Fuzzy,
        }
    }

    #[tokio::test]
    async fn test_first_upsert_inserts_with_count_one() {
        let pool = setup_test_db().await;

        upsert_unmatched(&pool, "Bob Smtih", &[candidate(0.8)]).await.unwrap();

        let record = load_unmatched(&pool, "Bob Smtih").await.unwrap().unwrap();
        assert_eq!(record.occurrence_count, 1);
        assert_eq!(record.resolution_status, ResolutionStatus::Unresolved);
        assert_eq!(record.candidates.len(), 1);
        assert!(record.resolved_counselor_id.is_none());
    }

    #[tokio::test]
    async fn test_reupsert_increments_and_overwrites_snapshot() {
        let pool = setup_test_db().await;

        upsert_unmatched(&pool, "Bob Smtih", &[candidate(0.8)]).await.unwrap();
        upsert_unmatched(&pool, "Bob Smtih", &[candidate(0.82), candidate(0.75)])
            .await
            .unwrap();

        let record = load_unmatched(&pool, "Bob Smtih").await.unwrap().unwrap();
        assert_eq!(record.occurrence_count, 2);
        assert_eq!(record.candidates.len(), 2);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM unmatched_counselors")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_reupsert_leaves_status_alone() {
        let pool = setup_test_db().await;

        upsert_unmatched(&pool, "Bob Smtih", &[]).await.unwrap();
        sqlx::query("UPDATE unmatched_counselors SET resolution_status = 'skipped' WHERE raw_name = 'Bob Smtih'")
            .execute(&pool)
            .await
            .unwrap();

        upsert_unmatched(&pool, "Bob Smtih", &[candidate(0.8)]).await.unwrap();

        let record = load_unmatched(&pool, "Bob Smtih").await.unwrap().unwrap();
        assert_eq!(record.resolution_status, ResolutionStatus::Skipped);
        assert_eq!(record.occurrence_count, 2);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_reads_as_empty() {
        let pool = setup_test_db().await;

        upsert_unmatched(&pool, "Bob Smtih", &[candidate(0.8)]).await.unwrap();
        sqlx::query("UPDATE unmatched_counselors SET candidates = '{not json' WHERE raw_name = 'Bob Smtih'")
            .execute(&pool)
            .await
            .unwrap();

        let record = load_unmatched(&pool, "Bob Smtih").await.unwrap().unwrap();
        assert!(record.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_list_unresolved_orders_busiest_first() {
        let pool = setup_test_db().await;

        for _ in 0..3 {
            upsert_unmatched(&pool, "Mike Jonson", &[]).await.unwrap();
        }
        upsert_unmatched(&pool, "Bob Smtih", &[]).await.unwrap();
        upsert_unmatched(&pool, "Al Brown", &[]).await.unwrap();
        upsert_unmatched(&pool, "Resolved Name", &[]).await.unwrap();
        sqlx::query(
            "UPDATE unmatched_counselors SET resolution_status = 'manually_matched' WHERE raw_name = 'Resolved Name'",
        )
        .execute(&pool)
        .await
        .unwrap();

        let records = list_unresolved(&pool).await.unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.raw_name.as_str()).collect();
        assert_eq!(names, vec!["Mike Jonson", "Al Brown", "Bob Smtih"]);
    }
}
