//! Counselor name resolution for badge-progress imports
//!
//! Advancement reports arrive with a free-text counselor column that
//! rarely matches the roster spelling exactly. This crate scores each
//! raw name against the member roster with a chain of matching
//! strategies, links confident matches automatically at import time,
//! and queues everything else for manual review with an append-only
//! audit trail and reversible decisions.

pub mod db;
pub mod matching;
pub mod services;

pub use db::decisions::{DecisionAction, ManualDecision};
pub use db::unmatched::{ResolutionStatus, UnmatchedRecord};
pub use matching::engine::{MatchCandidate, MatchEngine, DEFAULT_MIN_CONFIDENCE};
pub use matching::scorer::{MatchStrategy, NICKNAME_CONFIDENCE, PHONETIC_CONFIDENCE};
pub use services::import_gate::{GateOutcome, GateStats, ImportGate, DEFAULT_AUTO_ACCEPT_THRESHOLD};
pub use services::resolution::ResolutionService;
pub use services::statistics::{ResolutionStatistics, UserActivity};
