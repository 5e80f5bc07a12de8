//! Manual resolution workflow
//!
//! Human review operations over the unmatched queue. Every mutating
//! operation appends exactly one audit decision and applies its side
//! effects in a single transaction, so the registry, the audit log,
//! and dependent assignment rows never drift apart. Undo appends a
//! reversal decision rather than editing history.

use crate::db::decisions::DecisionAction;
use crate::db::settings;
use crate::db::unmatched::{self, ResolutionStatus, UnmatchedRecord};
use crate::matching::engine::{MatchCandidate, MatchEngine};
use crate::services::statistics::{self, ResolutionStatistics};
use rollcall_common::{Error, Result};
use sqlx::{Pool, Sqlite, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

/// Review surface over the unmatched registry and audit log
pub struct ResolutionService {
    db: Pool<Sqlite>,
    engine: MatchEngine,
}

impl ResolutionService {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self {
            engine: MatchEngine::new(db.clone()),
            db,
        }
    }

    /// All roster candidates above the configured floor for a raw name
    pub async fn find_matches(&self, raw_name: &str) -> Result<Vec<MatchCandidate>> {
        self.engine.find_candidates(raw_name, usize::MAX).await
    }

    /// Re-score a queued name against the live roster
    ///
    /// `limit` falls back to the candidate_limit setting when None.
    pub async fn get_candidates(
        &self,
        raw_name: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MatchCandidate>> {
        let limit = match limit {
            Some(n) => n,
            None => settings::get_candidate_limit(&self.db).await?,
        };

        self.engine.find_candidates(raw_name, limit).await
    }

    /// Names awaiting review, busiest first
    pub async fn list_unresolved(&self) -> Result<Vec<UnmatchedRecord>> {
        unmatched::list_unresolved(&self.db).await
    }

    /// Manually link a raw name to a roster member
    ///
    /// Sets the registry row to manually_matched and propagates the
    /// member to every still-unresolved assignment carrying this raw
    /// string. Assignments already linked keep their member.
    pub async fn match_counselor(
        &self,
        raw_name: &str,
        member_id: Uuid,
        confidence: f64,
        decided_by: &str,
        notes: Option<&str>,
    ) -> Result<()> {
        if !(0.0..=1.0).contains(&confidence) {
            warn!(raw_name = %raw_name, confidence, "Rejected manual match with out-of-range confidence");
            return Err(Error::InvalidInput(format!(
                "Confidence {} outside [0, 1]",
                confidence
            )));
        }

        let mut tx = self.db.begin().await?;

        let member_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roster_members WHERE guid = ?)")
                .bind(member_id.to_string())
                .fetch_one(&mut *tx)
                .await?;
        if !member_exists {
            warn!(raw_name = %raw_name, member_id = %member_id, "Manual match against a missing roster member");
            return Err(Error::NotFound(format!(
                "Roster member {} not found",
                member_id
            )));
        }

        require_unmatched(&mut tx, raw_name).await?;

        append_decision(
            &mut tx,
            DecisionInsert {
                raw_name,
                action: DecisionAction::Matched,
                counselor_id: Some(member_id),
                confidence: Some(confidence),
                decided_by,
                notes,
                supersedes: None,
            },
        )
        .await?;

        sqlx::query(
            "UPDATE unmatched_counselors
             SET resolution_status = ?, resolved_counselor_id = ?, notes = ?, updated_at = CURRENT_TIMESTAMP
             WHERE raw_name = ?",
        )
        .bind(ResolutionStatus::ManuallyMatched.as_str())
        .bind(member_id.to_string())
        .bind(notes)
        .bind(raw_name)
        .execute(&mut *tx)
        .await?;

        let propagated = sqlx::query(
            "UPDATE badge_assignments
             SET counselor_id = ?, match_confidence = ?, updated_at = CURRENT_TIMESTAMP
             WHERE counselor_raw = ? AND counselor_id IS NULL",
        )
        .bind(member_id.to_string())
        .bind(confidence)
        .bind(raw_name)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        info!(
            raw_name = %raw_name,
            member_id = %member_id,
            confidence,
            propagated,
            decided_by = %decided_by,
            "Manually matched counselor name"
        );

        Ok(())
    }

    /// Leave a name unresolved on purpose
    pub async fn skip(&self, raw_name: &str, decided_by: &str, notes: Option<&str>) -> Result<()> {
        self.set_status(
            raw_name,
            DecisionAction::Skipped,
            ResolutionStatus::Skipped,
            decided_by,
            notes,
        )
        .await
    }

    /// Mark a name as not a real counselor (stray cell content)
    pub async fn mark_invalid(
        &self,
        raw_name: &str,
        decided_by: &str,
        notes: Option<&str>,
    ) -> Result<()> {
        self.set_status(
            raw_name,
            DecisionAction::MarkedInvalid,
            ResolutionStatus::MarkedInvalid,
            decided_by,
            notes,
        )
        .await
    }

    /// Flag a name as someone missing from the roster
    pub async fn flag_new_record(
        &self,
        raw_name: &str,
        decided_by: &str,
        notes: Option<&str>,
    ) -> Result<()> {
        self.set_status(
            raw_name,
            DecisionAction::NewRecordNeeded,
            ResolutionStatus::NewRecordNeeded,
            decided_by,
            notes,
        )
        .await
    }

    /// Reverse the most recent decision for a raw name
    ///
    /// Appends an `undone` decision referencing the reversed one,
    /// resets the registry row to unresolved, and clears the member
    /// link on every assignment carrying this raw string. Full
    /// rollback, never partial.
    pub async fn undo(&self, raw_name: &str, decided_by: &str) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let target: Option<(i64, String)> = sqlx::query_as(
            r#"
            SELECT id, action FROM resolution_decisions
            WHERE raw_name = ?
              AND action != 'undone'
              AND id NOT IN (
                  SELECT supersedes FROM resolution_decisions
                  WHERE raw_name = ? AND action = 'undone' AND supersedes IS NOT NULL
              )
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(raw_name)
        .bind(raw_name)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((target_id, target_action)) = target else {
            warn!(raw_name = %raw_name, "Undo requested with no reversible decision");
            return Err(Error::NotFound(format!(
                "No reversible decision for '{}'",
                raw_name
            )));
        };

        append_decision(
            &mut tx,
            DecisionInsert {
                raw_name,
                action: DecisionAction::Undone,
                counselor_id: None,
                confidence: None,
                decided_by,
                notes: None,
                supersedes: Some(target_id),
            },
        )
        .await?;

        sqlx::query(
            "UPDATE unmatched_counselors
             SET resolution_status = 'unresolved', resolved_counselor_id = NULL, notes = NULL,
                 updated_at = CURRENT_TIMESTAMP
             WHERE raw_name = ?",
        )
        .bind(raw_name)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE badge_assignments
             SET counselor_id = NULL, match_confidence = NULL, updated_at = CURRENT_TIMESTAMP
             WHERE counselor_raw = ?",
        )
        .bind(raw_name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            raw_name = %raw_name,
            undone_decision = target_id,
            undone_action = %target_action,
            decided_by = %decided_by,
            "Undid manual decision"
        );

        Ok(())
    }

    /// Aggregate counts over the registry and audit log
    pub async fn get_statistics(&self) -> Result<ResolutionStatistics> {
        statistics::collect_statistics(&self.db).await
    }

    /// Shared path for the no-propagation decisions
    async fn set_status(
        &self,
        raw_name: &str,
        action: DecisionAction,
        status: ResolutionStatus,
        decided_by: &str,
        notes: Option<&str>,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;

        require_unmatched(&mut tx, raw_name).await?;

        append_decision(
            &mut tx,
            DecisionInsert {
                raw_name,
                action,
                counselor_id: None,
                confidence: None,
                decided_by,
                notes,
                supersedes: None,
            },
        )
        .await?;

        sqlx::query(
            "UPDATE unmatched_counselors
             SET resolution_status = ?, resolved_counselor_id = NULL, notes = ?,
                 updated_at = CURRENT_TIMESTAMP
             WHERE raw_name = ?",
        )
        .bind(status.as_str())
        .bind(notes)
        .bind(raw_name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            raw_name = %raw_name,
            status = status.as_str(),
            decided_by = %decided_by,
            "Resolved counselor name without a match"
        );

        Ok(())
    }
}

/// Fields for one audit log append
struct DecisionInsert<'a> {
    raw_name: &'a str,
    action: DecisionAction,
    counselor_id: Option<Uuid>,
    confidence: Option<f64>,
    decided_by: &'a str,
    notes: Option<&'a str>,
    supersedes: Option<i64>,
}

async fn append_decision(
    tx: &mut Transaction<'_, Sqlite>,
    decision: DecisionInsert<'_>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO resolution_decisions (
            raw_name, action, counselor_id, confidence, decided_by, notes, supersedes
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(decision.raw_name)
    .bind(decision.action.as_str())
    .bind(decision.counselor_id.map(|id| id.to_string()))
    .bind(decision.confidence)
    .bind(decision.decided_by)
    .bind(decision.notes)
    .bind(decision.supersedes)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn require_unmatched(tx: &mut Transaction<'_, Sqlite>, raw_name: &str) -> Result<()> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM unmatched_counselors WHERE raw_name = ?)")
            .bind(raw_name)
            .fetch_one(&mut **tx)
            .await?;

    if !exists {
        warn!(raw_name = %raw_name, "No unmatched record for raw counselor name");
        return Err(Error::NotFound(format!(
            "No unmatched record for '{}'",
            raw_name
        )));
    }

    Ok(())
}
