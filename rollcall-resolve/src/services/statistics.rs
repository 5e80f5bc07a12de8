//! Resolution statistics
//!
//! Read-only aggregation over the unmatched registry and the audit
//! log. Nothing here mutates state; numbers are computed fresh on
//! every call.

use crate::db::unmatched::ResolutionStatus;
use rollcall_common::Result;
use serde::Serialize;
use sqlx::{Pool, Row, Sqlite};
use tracing::warn;

/// Aggregate review-queue and reviewer-activity counts
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionStatistics {
    pub unresolved: i64,
    pub manually_matched: i64,
    pub skipped: i64,
    pub marked_invalid: i64,
    pub new_record_needed: i64,
    /// Registry rows across all statuses
    pub total_unmatched: i64,
    /// Sum of occurrence counts, one per imported sighting
    pub total_assignments: i64,
    pub user_activity: Vec<UserActivity>,
}

/// Audit-log totals for one reviewer
#[derive(Debug, Clone, Serialize)]
pub struct UserActivity {
    pub decided_by: String,
    pub decision_count: i64,
    pub distinct_name_count: i64,
}

/// Compute current statistics from the store
pub async fn collect_statistics(db: &Pool<Sqlite>) -> Result<ResolutionStatistics> {
    let mut stats = ResolutionStatistics::default();

    let status_rows = sqlx::query(
        "SELECT resolution_status, COUNT(*) AS row_count, SUM(occurrence_count) AS occurrence_sum
         FROM unmatched_counselors
         GROUP BY resolution_status",
    )
    .fetch_all(db)
    .await?;

    for row in &status_rows {
        let status_str: String = row.get("resolution_status");
        let row_count: i64 = row.get("row_count");
        let occurrence_sum: Option<i64> = row.get("occurrence_sum");

        stats.total_unmatched += row_count;
        stats.total_assignments += occurrence_sum.unwrap_or(0);

        match status_str.parse::<ResolutionStatus>() {
            Ok(ResolutionStatus::Unresolved) => stats.unresolved = row_count,
            Ok(ResolutionStatus::ManuallyMatched) => stats.manually_matched = row_count,
            Ok(ResolutionStatus::Skipped) => stats.skipped = row_count,
            Ok(ResolutionStatus::MarkedInvalid) => stats.marked_invalid = row_count,
            Ok(ResolutionStatus::NewRecordNeeded) => stats.new_record_needed = row_count,
            Err(e) => warn!(error = %e, "Skipping unknown resolution status in statistics"),
        }
    }

    stats.user_activity = sqlx::query(
        "SELECT decided_by, COUNT(*) AS decision_count, COUNT(DISTINCT raw_name) AS distinct_name_count
         FROM resolution_decisions
         GROUP BY decided_by
         ORDER BY decision_count DESC, decided_by ASC",
    )
    .fetch_all(db)
    .await?
    .iter()
    .map(|row| UserActivity {
        decided_by: row.get("decided_by"),
        decision_count: row.get("decision_count"),
        distinct_name_count: row.get("distinct_name_count"),
    })
    .collect();

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

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

    async fn seed_unmatched(pool: &SqlitePool, raw: &str, status: &str, occurrences: i64) {
        sqlx::query(
            "INSERT INTO unmatched_counselors (raw_name, occurrence_count, resolution_status)
             VALUES (?, ?, ?)",
        )
        .bind(raw)
        .bind(occurrences)
        .bind(status)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn seed_decision(pool: &SqlitePool, raw: &str, action: &str, decided_by: &str) {
        sqlx::query(
            "INSERT INTO resolution_decisions (raw_name, action, decided_by) VALUES (?, ?, ?)",
        )
        .bind(raw)
        .bind(action)
        .bind(decided_by)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_empty_store_reports_zeros() {
        let pool = setup_test_db().await;

        let stats = collect_statistics(&pool).await.unwrap();
        assert_eq!(stats.total_unmatched, 0);
        assert_eq!(stats.total_assignments, 0);
        assert_eq!(stats.unresolved, 0);
        assert!(stats.user_activity.is_empty());
    }

    #[tokio::test]
    async fn test_status_counts_and_totals() {
        let pool = setup_test_db().await;

        for i in 0..3 {
            seed_unmatched(&pool, &format!("matched-{}", i), "manually_matched", 1).await;
        }
        for i in 0..2 {
            seed_unmatched(&pool, &format!("skipped-{}", i), "skipped", 1).await;
        }
        for i in 0..5 {
            seed_unmatched(&pool, &format!("open-{}", i), "unresolved", 1).await;
        }

        let stats = collect_statistics(&pool).await.unwrap();
        assert_eq!(stats.manually_matched, 3);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.unresolved, 5);
        assert_eq!(stats.marked_invalid, 0);
        assert_eq!(stats.new_record_needed, 0);
        assert_eq!(stats.total_unmatched, 10);
        assert_eq!(stats.total_assignments, 10);
    }

    #[tokio::test]
    async fn test_total_assignments_sums_occurrences() {
        let pool = setup_test_db().await;

        seed_unmatched(&pool, "Mike Jonson", "unresolved", 7).await;
        seed_unmatched(&pool, "Bob Smtih", "skipped", 3).await;

        let stats = collect_statistics(&pool).await.unwrap();
        assert_eq!(stats.total_unmatched, 2);
        assert_eq!(stats.total_assignments, 10);
    }

    #[tokio::test]
    async fn test_user_activity_ordered_by_decision_count() {
        let pool = setup_test_db().await;
        seed_unmatched(&pool, "A", "skipped", 1).await;
        seed_unmatched(&pool, "B", "skipped", 1).await;

        seed_decision(&pool, "A", "skipped", "alice").await;
        seed_decision(&pool, "A", "undone", "alice").await;
        seed_decision(&pool, "A", "skipped", "alice").await;
        seed_decision(&pool, "B", "skipped", "bob").await;

        let stats = collect_statistics(&pool).await.unwrap();
        assert_eq!(stats.user_activity.len(), 2);

        assert_eq!(stats.user_activity[0].decided_by, "alice");
        assert_eq!(stats.user_activity[0].decision_count, 3);
        assert_eq!(stats.user_activity[0].distinct_name_count, 1);

        assert_eq!(stats.user_activity[1].decided_by, "bob");
        assert_eq!(stats.user_activity[1].decision_count, 1);
    }
}
