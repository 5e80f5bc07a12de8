//! Counselor mapping database operations
//!
//! Mappings cache automatic matches so repeat imports of the same raw
//! counselor string link without re-scoring the roster. Manual
//! decisions never write here; they live in the audit log.

use crate::matching::scorer::MatchStrategy;
use rollcall_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Cached automatic match, keyed by the raw counselor string
#[derive(Debug, Clone)]
pub struct NameMapping {
    pub raw_name: String,
    pub counselor_id: Uuid,
    pub confidence: f64,
    pub strategy: MatchStrategy,
    pub created_by: String,
}

/// Load the cached mapping for a raw counselor string, if any
pub async fn load_mapping(pool: &SqlitePool, raw_name: &str) -> Result<Option<NameMapping>> {
    let row = sqlx::query(
        r#"
        SELECT raw_name, counselor_id, confidence, strategy, created_by
        FROM counselor_mappings
        WHERE raw_name = ?
        "#,
    )
    .bind(raw_name)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let counselor_str: String = row.get("counselor_id");
            let strategy_str: String = row.get("strategy");

            Ok(Some(NameMapping {
                raw_name: row.get("raw_name"),
                counselor_id: Uuid::parse_str(&counselor_str)
                    .map_err(|e| Error::Internal(format!("Invalid counselor id on mapping: {}", e)))?,
                confidence: row.get("confidence"),
                strategy: strategy_str.parse().map_err(Error::Internal)?,
                created_by: row.get("created_by"),
            }))
        }
        None => Ok(None),
    }
}
