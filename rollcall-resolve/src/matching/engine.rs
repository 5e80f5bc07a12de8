//! Roster match engine
//!
//! Runs the full strategy chain for one raw counselor name against the
//! member roster and returns ranked candidates. The confidence floor
//! comes from settings so it can be tuned without a redeploy; exact and
//! nickname hits always pass the floor.

use crate::db::{roster, settings};
use crate::matching::normalizer::normalize;
use crate::matching::scorer::{CandidateScorer, MatchStrategy};
use rollcall_common::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::debug;
use uuid::Uuid;

/// Confidence floor applied when the setting row is missing
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;

/// One ranked roster match for a raw counselor name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub member_id: Uuid,
    pub member_name: String,
    pub confidence: f64,
    pub strategy: MatchStrategy,
}

/// Scores raw counselor names against the full roster
pub struct MatchEngine {
    db: Pool<Sqlite>,
    scorer: CandidateScorer,
    min_confidence: Option<f64>,
}

impl MatchEngine {
    /// Engine that reads its confidence floor from settings per call
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self {
            db,
            scorer: CandidateScorer::new(),
            min_confidence: None,
        }
    }

    /// Engine with a pinned confidence floor, bypassing settings
    pub fn with_min_confidence(db: Pool<Sqlite>, min_confidence: f64) -> Self {
        Self {
            db,
            scorer: CandidateScorer::new(),
            min_confidence: Some(min_confidence),
        }
    }

    /// Score `raw_name` against every roster member
    ///
    /// Returns at most `limit` candidates ordered by confidence
    /// descending, member id ascending on ties. A name that normalizes
    /// to empty returns no candidates. Fuzzy and phonetic hits below
    /// the confidence floor are dropped; exact and nickname hits are
    /// kept regardless of the floor.
    pub async fn find_candidates(&self, raw_name: &str, limit: usize) -> Result<Vec<MatchCandidate>> {
        let normalized = normalize(raw_name);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        let floor = match self.min_confidence {
            Some(value) => value,
            None => settings::get_min_match_confidence(&self.db).await?,
        };

        let members = roster::list_members(&self.db).await?;
        let mut candidates: Vec<MatchCandidate> = Vec::new();

        for member in &members {
            let Some(hit) = self.scorer.score(&normalized, member) else {
                continue;
            };

            let bypasses_floor =
                matches!(hit.strategy, MatchStrategy::Exact | MatchStrategy::Nickname);
            if hit.confidence < floor && !bypasses_floor {
                continue;
            }

            candidates.push(MatchCandidate {
                member_id: member.guid,
                member_name: member.display_name(),
                confidence: hit.confidence,
                strategy: hit.strategy,
            });
        }

        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.member_id.cmp(&b.member_id))
        });
        candidates.truncate(limit);

        debug!(
            raw_name = %raw_name,
            normalized = %normalized,
            roster_size = members.len(),
            candidates = candidates.len(),
            "Scored counselor name against roster"
        );

        Ok(candidates)
    }

    /// The single highest-confidence candidate, if any
    pub async fn best_candidate(&self, raw_name: &str) -> Result<Option<MatchCandidate>> {
        Ok(self.find_candidates(raw_name, 1).await?.into_iter().next())
    }
}
