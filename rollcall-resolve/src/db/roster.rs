//! Roster member database operations
//!
//! The roster is the canonical member directory, owned by the
//! membership importer. This crate only reads it during matching;
//! `save_member` exists as the importer's write seam.

use rollcall_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Canonical directory entry for one adult member
#[derive(Debug, Clone)]
pub struct RosterMember {
    pub guid: Uuid,
    pub given_name: String,
    pub family_name: String,
    pub email: Option<String>,
}

impl RosterMember {
    pub fn new(given_name: String, family_name: String) -> Self {
        Self {
            guid: Uuid::new_v4(),
            given_name,
            family_name,
            email: None,
        }
    }

    /// Display form used in candidate lists
    pub fn display_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

/// Save a roster member, updating names and email on conflict
pub async fn save_member(pool: &SqlitePool, member: &RosterMember) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO roster_members (guid, given_name, family_name, email, created_at, updated_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(guid) DO UPDATE SET
            given_name = excluded.given_name,
            family_name = excluded.family_name,
            email = excluded.email,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(member.guid.to_string())
    .bind(&member.given_name)
    .bind(&member.family_name)
    .bind(&member.email)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load one roster member by id
pub async fn load_member(pool: &SqlitePool, guid: Uuid) -> Result<Option<RosterMember>> {
    let row = sqlx::query(
        "SELECT guid, given_name, family_name, email FROM roster_members WHERE guid = ?",
    )
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(row_to_member(&row)?)),
        None => Ok(None),
    }
}

/// List the full roster, ordered by family then given name
pub async fn list_members(pool: &SqlitePool) -> Result<Vec<RosterMember>> {
    let rows = sqlx::query(
        "SELECT guid, given_name, family_name, email FROM roster_members ORDER BY family_name, given_name",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_member).collect()
}

fn row_to_member(row: &sqlx::sqlite::SqliteRow) -> Result<RosterMember> {
    let guid_str: String = row.get("guid");

    Ok(RosterMember {
        guid: Uuid::parse_str(&guid_str)
            .map_err(|e| Error::Internal(format!("Invalid roster member guid: {}", e)))?,
        given_name: row.get("given_name"),
        family_name: row.get("family_name"),
        email: row.get("email"),
    })
}
