//! Candidate scoring
//!
//! Scores one raw counselor name against one roster member through an
//! ordered strategy chain. Exact and nickname hits short-circuit;
//! otherwise fuzzy and phonetic are both evaluated and the higher
//! score wins, keeping the fuzzy label on a tie since its score
//! carries more information than the flat phonetic constant.

use crate::db::roster::RosterMember;
use crate::matching::nicknames::nickname_linked;
use crate::matching::normalizer::normalize;
use crate::matching::phonetic::phonetic_match;
use serde::{Deserialize, Serialize};

/// Confidence assigned when a nickname pairs with an exact family name
pub const NICKNAME_CONFIDENCE: f64 = 0.95;

/// Confidence assigned when only the phonetic buckets agree
pub const PHONETIC_CONFIDENCE: f64 = 0.8;

/// How a candidate earned its confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Nickname,
    Fuzzy,
    Phonetic,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::Nickname => "nickname",
            MatchStrategy::Fuzzy => "fuzzy",
            MatchStrategy::Phonetic => "phonetic",
        }
    }
}

impl std::str::FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(MatchStrategy::Exact),
            "nickname" => Ok(MatchStrategy::Nickname),
            "fuzzy" => Ok(MatchStrategy::Fuzzy),
            "phonetic" => Ok(MatchStrategy::Phonetic),
            other => Err(format!("Unknown match strategy: {}", other)),
        }
    }
}

/// A scored pairing of a raw name against one roster member
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredName {
    pub confidence: f64,
    pub strategy: MatchStrategy,
}

/// Multi-strategy scorer for a single (raw name, member) pair
pub struct CandidateScorer;

impl CandidateScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score one roster member against an already-normalized raw name
    ///
    /// `normalized` must be in `normalizer::normalize` form. Returns
    /// None when no strategy produces a non-zero score.
    pub fn score(&self, normalized: &str, member: &RosterMember) -> Option<ScoredName> {
        if normalized.is_empty() {
            return None;
        }

        let variants = name_variants(member);

        // 1. Exact: any canonical name ordering
        if variants.iter().any(|v| v == normalized) {
            return Some(ScoredName {
                confidence: 1.0,
                strategy: MatchStrategy::Exact,
            });
        }

        // 2. Nickname: informal given name plus exact family name
        if let Some(hit) = nickname_score(normalized, member) {
            return Some(hit);
        }

        // 3/4. Fuzzy vs phonetic: evaluate both, keep the higher
        let fuzzy = variants
            .iter()
            .map(|v| strsim::normalized_levenshtein(normalized, v))
            .fold(0.0_f64, f64::max);

        let mut best = ScoredName {
            confidence: fuzzy,
            strategy: MatchStrategy::Fuzzy,
        };

        if phonetic_hit(normalized, member) && PHONETIC_CONFIDENCE > best.confidence {
            best = ScoredName {
                confidence: PHONETIC_CONFIDENCE,
                strategy: MatchStrategy::Phonetic,
            };
        }

        (best.confidence > 0.0).then_some(best)
    }
}

impl Default for CandidateScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// The three normalized orderings of a member's canonical name
fn name_variants(member: &RosterMember) -> [String; 3] {
    let given = &member.given_name;
    let family = &member.family_name;
    [
        normalize(&format!("{} {}", given, family)),
        normalize(&format!("{}, {}", family, given)),
        normalize(&format!("{} {}", family, given)),
    ]
}

/// Nickname strategy: at least two tokens, last token equals the
/// family name, first token nickname-linked to the given name
fn nickname_score(normalized: &str, member: &RosterMember) -> Option<ScoredName> {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }

    let last = tokens[tokens.len() - 1];
    if !last.eq_ignore_ascii_case(&member.family_name) {
        return None;
    }

    nickname_linked(tokens[0], &member.given_name).then_some(ScoredName {
        confidence: NICKNAME_CONFIDENCE,
        strategy: MatchStrategy::Nickname,
    })
}

/// Phonetic strategy: at least two tokens, first/last tokens share
/// phonetic buckets with the given/family names respectively
fn phonetic_hit(normalized: &str, member: &RosterMember) -> bool {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    if tokens.len() < 2 {
        return false;
    }

    phonetic_match(tokens[0], &member.given_name)
        && phonetic_match(tokens[tokens.len() - 1], &member.family_name)
}
