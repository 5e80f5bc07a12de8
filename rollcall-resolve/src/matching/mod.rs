//! Name matching strategies
//!
//! The pipeline normalizes a raw counselor name once, then scores it
//! against every roster member through an ordered strategy chain
//! (exact, nickname, fuzzy, phonetic).

pub mod engine;
pub mod nicknames;
pub mod normalizer;
pub mod phonetic;
pub mod scorer;

pub use engine::{MatchCandidate, MatchEngine};
pub use scorer::{CandidateScorer, MatchStrategy, ScoredName};
