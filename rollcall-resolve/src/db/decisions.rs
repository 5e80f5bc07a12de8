//! Manual decision audit log
//!
//! Append-only record of every manual resolution action. Undo never
//! rewrites history; it appends an `undone` row pointing at the
//! decision it reverses, so the full chain stays reconstructible.

use rollcall_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// What a reviewer did with a raw counselor name
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Matched,
    Skipped,
    MarkedInvalid,
    NewRecordNeeded,
    Undone,
}

impl DecisionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::Matched => "matched",
            DecisionAction::Skipped => "skipped",
            DecisionAction::MarkedInvalid => "marked_invalid",
            DecisionAction::NewRecordNeeded => "new_record_needed",
            DecisionAction::Undone => "undone",
        }
    }
}

impl std::str::FromStr for DecisionAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "matched" => Ok(DecisionAction::Matched),
            "skipped" => Ok(DecisionAction::Skipped),
            "marked_invalid" => Ok(DecisionAction::MarkedInvalid),
            "new_record_needed" => Ok(DecisionAction::NewRecordNeeded),
            "undone" => Ok(DecisionAction::Undone),
            other => Err(format!("Unknown decision action: {}", other)),
        }
    }
}

/// One audit log entry
#[derive(Debug, Clone, serde::Serialize)]
pub struct ManualDecision {
    pub id: i64,
    pub raw_name: String,
    pub action: DecisionAction,
    pub counselor_id: Option<Uuid>,
    pub confidence: Option<f64>,
    pub decided_by: String,
    pub notes: Option<String>,
    /// For `undone` rows, the id of the decision being reversed
    pub supersedes: Option<i64>,
    pub created_at: String,
}

/// Full decision history for a raw name, oldest first
pub async fn list_decisions(pool: &SqlitePool, raw_name: &str) -> Result<Vec<ManualDecision>> {
    let rows = sqlx::query(
        r#"
        SELECT id, raw_name, action, counselor_id, confidence, decided_by,
               notes, supersedes, created_at
        FROM resolution_decisions
        WHERE raw_name = ?
        ORDER BY id ASC
        "#,
    )
    .bind(raw_name)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_decision).collect()
}

fn row_to_decision(row: &sqlx::sqlite::SqliteRow) -> Result<ManualDecision> {
    let action_str: String = row.get("action");
    let counselor_str: Option<String> = row.get("counselor_id");

    let counselor_id = match counselor_str {
        Some(s) => Some(
            Uuid::parse_str(&s)
                .map_err(|e| Error::Internal(format!("Invalid counselor id on decision: {}", e)))?,
        ),
        None => None,
    };

    Ok(ManualDecision {
        id: row.get("id"),
        raw_name: row.get("raw_name"),
        action: action_str.parse().map_err(Error::Internal)?,
        counselor_id,
        confidence: row.get("confidence"),
        decided_by: row.get("decided_by"),
        notes: row.get("notes"),
        supersedes: row.get("supersedes"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[tokio::test]
    async fn test_list_decisions_in_insertion_order() {
        let pool = setup_test_db().await;
        let member_id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO resolution_decisions (raw_name, action, counselor_id, confidence, decided_by)
             VALUES ('Bob Smtih', 'matched', ?, 0.95, 'alice')",
        )
        .bind(member_id.to_string())
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO resolution_decisions (raw_name, action, decided_by, supersedes)
             VALUES ('Bob Smtih', 'undone', 'bob', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let decisions = list_decisions(&pool, "Bob Smtih").await.unwrap();
        assert_eq!(decisions.len(), 2);

        assert_eq!(decisions[0].action, DecisionAction::Matched);
        assert_eq!(decisions[0].counselor_id, Some(member_id));
        assert_eq!(decisions[0].confidence, Some(0.95));
        assert!(decisions[0].supersedes.is_none());

        assert_eq!(decisions[1].action, DecisionAction::Undone);
        assert_eq!(decisions[1].supersedes, Some(decisions[0].id));
        assert_eq!(decisions[1].decided_by, "bob");
    }

    #[tokio::test]
    async fn test_list_decisions_scopes_to_raw_name() {
        let pool = setup_test_db().await;

        sqlx::query(
            "INSERT INTO resolution_decisions (raw_name, action, decided_by)
             VALUES ('A', 'skipped', 'alice'), ('B', 'skipped', 'alice')",
        )
        .execute(&pool)
        .await
        .unwrap();

        assert_eq!(list_decisions(&pool, "A").await.unwrap().len(), 1);
        assert!(list_decisions(&pool, "C").await.unwrap().is_empty());
    }
}
