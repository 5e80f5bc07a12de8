//! Badge assignment database operations
//!
//! Assignment rows are created by the report importer; this crate
//! fills in counselor_id and match_confidence as raw counselor names
//! get resolved.

use rollcall_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// One scout/badge line from an imported advancement report
#[derive(Debug, Clone)]
pub struct BadgeAssignment {
    pub guid: Uuid,
    pub scout_name: String,
    pub badge_name: String,
    pub counselor_raw: Option<String>,
    pub counselor_id: Option<Uuid>,
    pub match_confidence: Option<f64>,
}

impl BadgeAssignment {
    /// New unresolved assignment as the importer would create it
    pub fn new(scout_name: String, badge_name: String, counselor_raw: Option<String>) -> Self {
        Self {
            guid: Uuid::new_v4(),
            scout_name,
            badge_name,
            counselor_raw,
            counselor_id: None,
            match_confidence: None,
        }
    }
}

/// Save an assignment row, overwriting resolution state on conflict
pub async fn save_assignment(pool: &SqlitePool, assignment: &BadgeAssignment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO badge_assignments (
            guid, scout_name, badge_name, counselor_raw, counselor_id,
            match_confidence, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(guid) DO UPDATE SET
            scout_name = excluded.scout_name,
            badge_name = excluded.badge_name,
            counselor_raw = excluded.counselor_raw,
            counselor_id = excluded.counselor_id,
            match_confidence = excluded.match_confidence,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(assignment.guid.to_string())
    .bind(&assignment.scout_name)
    .bind(&assignment.badge_name)
    .bind(&assignment.counselor_raw)
    .bind(assignment.counselor_id.map(|id| id.to_string()))
    .bind(assignment.match_confidence)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load one assignment by id
pub async fn load_assignment(pool: &SqlitePool, guid: Uuid) -> Result<Option<BadgeAssignment>> {
    let row = sqlx::query(
        r#"
        SELECT guid, scout_name, badge_name, counselor_raw, counselor_id, match_confidence
        FROM badge_assignments
        WHERE guid = ?
        "#,
    )
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(row_to_assignment(&row)?)),
        None => Ok(None),
    }
}

/// All assignments carrying a given raw counselor string
pub async fn list_for_counselor_raw(
    pool: &SqlitePool,
    raw_name: &str,
) -> Result<Vec<BadgeAssignment>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, scout_name, badge_name, counselor_raw, counselor_id, match_confidence
        FROM badge_assignments
        WHERE counselor_raw = ?
        ORDER BY scout_name, badge_name
        "#,
    )
    .bind(raw_name)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_assignment).collect()
}

fn row_to_assignment(row: &sqlx::sqlite::SqliteRow) -> Result<BadgeAssignment> {
    let guid_str: String = row.get("guid");
    let counselor_str: Option<String> = row.get("counselor_id");

    let counselor_id = match counselor_str {
        Some(s) => Some(
            Uuid::parse_str(&s)
                .map_err(|e| Error::Internal(format!("Invalid counselor id on assignment: {}", e)))?,
        ),
        None => None,
    };

    Ok(BadgeAssignment {
        guid: Uuid::parse_str(&guid_str)
            .map_err(|e| Error::Internal(format!("Invalid assignment guid: {}", e)))?,
        scout_name: row.get("scout_name"),
        badge_name: row.get("badge_name"),
        counselor_raw: row.get("counselor_raw"),
        counselor_id,
        match_confidence: row.get("match_confidence"),
    })
}
