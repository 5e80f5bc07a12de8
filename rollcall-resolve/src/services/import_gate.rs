//! Import-time decision gate
//!
//! Classifies each counselor cell as an advancement report is
//! imported: link automatically when the best candidate clears the
//! auto-accept threshold, queue for manual review when candidates
//! exist but fall short, leave unassigned when there is nothing to
//! match. Raw strings the gate has auto-matched before link straight
//! from the mapping cache without re-scoring the roster.

use crate::db::{mappings, roster, settings, unmatched};
use crate::matching::engine::{MatchCandidate, MatchEngine};
use crate::matching::normalizer::normalize;
use rollcall_common::{Error, Result};
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Auto-accept threshold applied when the setting row is missing
pub const DEFAULT_AUTO_ACCEPT_THRESHOLD: f64 = 0.9;

/// Writer recorded on mappings created by the gate
const GATE_ACTOR: &str = "import";

/// How the gate classified one counselor cell
#[derive(Debug, Clone)]
pub enum GateOutcome {
    /// Linked automatically; `from_cache` when a stored mapping served it
    AutoAccepted {
        candidate: MatchCandidate,
        from_cache: bool,
    },
    /// Queued for review with the candidates that fell short
    NeedsReview { candidates: Vec<MatchCandidate> },
    /// Blank cell, or no roster candidate cleared the floor
    Unassigned,
}

/// Tally of outcomes across one import run
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GateStats {
    pub processed: u64,
    pub auto_accepted: u64,
    pub needs_review: u64,
    pub unassigned: u64,
    pub cache_hits: u64,
}

impl GateStats {
    pub fn record(&mut self, outcome: &GateOutcome) {
        self.processed += 1;
        match outcome {
            GateOutcome::AutoAccepted { from_cache, .. } => {
                self.auto_accepted += 1;
                if *from_cache {
                    self.cache_hits += 1;
                }
            }
            GateOutcome::NeedsReview { .. } => self.needs_review += 1,
            GateOutcome::Unassigned => self.unassigned += 1,
        }
    }
}

/// Import-time classifier for raw counselor names
pub struct ImportGate {
    db: Pool<Sqlite>,
    engine: MatchEngine,
}

impl ImportGate {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self {
            engine: MatchEngine::new(db.clone()),
            db,
        }
    }

    /// Classify one counselor cell and apply the outcome
    ///
    /// Auto-accept upserts the mapping cache and links the assignment
    /// row in one transaction. Needs-review and no-candidate outcomes
    /// register the raw name in the unmatched queue and leave the
    /// assignment untouched. A blank cell is unassigned without a
    /// registry entry.
    pub async fn process(&self, raw_name: &str, assignment_id: Uuid) -> Result<GateOutcome> {
        if normalize(raw_name).is_empty() {
            debug!(assignment_id = %assignment_id, "Blank counselor cell, leaving unassigned");
            return Ok(GateOutcome::Unassigned);
        }

        if let Some(mapping) = mappings::load_mapping(&self.db, raw_name).await? {
            match roster::load_member(&self.db, mapping.counselor_id).await? {
                Some(member) => {
                    let mut tx = self.db.begin().await?;
                    link_assignment(&mut tx, assignment_id, mapping.counselor_id, mapping.confidence)
                        .await?;
                    tx.commit().await?;

                    debug!(
                        raw_name = %raw_name,
                        member = %member.display_name(),
                        "Linked counselor from mapping cache"
                    );

                    return Ok(GateOutcome::AutoAccepted {
                        candidate: MatchCandidate {
                            member_id: mapping.counselor_id,
                            member_name: member.display_name(),
                            confidence: mapping.confidence,
                            strategy: mapping.strategy,
                        },
                        from_cache: true,
                    });
                }
                None => {
                    // Stale cache entry; fall through to fresh scoring
                    warn!(
                        raw_name = %raw_name,
                        counselor_id = %mapping.counselor_id,
                        "Cached mapping points at a missing roster member, re-scoring"
                    );
                }
            }
        }

        let candidates = self.engine.find_candidates(raw_name, usize::MAX).await?;

        if candidates.is_empty() {
            unmatched::upsert_unmatched(&self.db, raw_name, &[]).await?;
            debug!(raw_name = %raw_name, "No candidates, registered as unassigned");
            return Ok(GateOutcome::Unassigned);
        }

        let threshold = settings::get_auto_accept_threshold(&self.db).await?;
        let best = &candidates[0];

        if best.confidence >= threshold {
            self.auto_accept(raw_name, assignment_id, best).await?;
            return Ok(GateOutcome::AutoAccepted {
                candidate: best.clone(),
                from_cache: false,
            });
        }

        unmatched::upsert_unmatched(&self.db, raw_name, &candidates).await?;
        debug!(
            raw_name = %raw_name,
            best_confidence = best.confidence,
            candidates = candidates.len(),
            "Queued counselor name for review"
        );

        Ok(GateOutcome::NeedsReview { candidates })
    }

    /// Classify a run of (counselor cell, assignment id) pairs
    pub async fn process_batch(&self, pairs: &[(String, Uuid)]) -> Result<GateStats> {
        let mut stats = GateStats::default();

        for (raw_name, assignment_id) in pairs {
            let outcome = self.process(raw_name, *assignment_id).await?;
            stats.record(&outcome);
        }

        info!(
            processed = stats.processed,
            auto_accepted = stats.auto_accepted,
            needs_review = stats.needs_review,
            unassigned = stats.unassigned,
            cache_hits = stats.cache_hits,
            "Import gate pass complete"
        );

        Ok(stats)
    }

    /// Mapping upsert plus assignment link, atomically
    async fn auto_accept(
        &self,
        raw_name: &str,
        assignment_id: Uuid,
        candidate: &MatchCandidate,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO counselor_mappings (raw_name, counselor_id, confidence, strategy, created_by)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(raw_name) DO UPDATE SET
                counselor_id = excluded.counselor_id,
                confidence = excluded.confidence,
                strategy = excluded.strategy,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(raw_name)
        .bind(candidate.member_id.to_string())
        .bind(candidate.confidence)
        .bind(candidate.strategy.as_str())
        .bind(GATE_ACTOR)
        .execute(&mut *tx)
        .await?;

        link_assignment(&mut tx, assignment_id, candidate.member_id, candidate.confidence).await?;

        tx.commit().await?;

        info!(
            raw_name = %raw_name,
            member = %candidate.member_name,
            confidence = candidate.confidence,
            strategy = candidate.strategy.as_str(),
            "Auto-accepted counselor match"
        );

        Ok(())
    }
}

/// Point one assignment row at a resolved member
async fn link_assignment(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    assignment_id: Uuid,
    member_id: Uuid,
    confidence: f64,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE badge_assignments
         SET counselor_id = ?, match_confidence = ?, updated_at = CURRENT_TIMESTAMP
         WHERE guid = ?",
    )
    .bind(member_id.to_string())
    .bind(confidence)
    .bind(assignment_id.to_string())
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "Badge assignment {} not found",
            assignment_id
        )));
    }

    Ok(())
}
