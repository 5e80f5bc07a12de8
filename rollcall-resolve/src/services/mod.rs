//! Service layer for counselor name resolution

pub mod import_gate;
pub mod resolution;
pub mod statistics;

pub use import_gate::{GateOutcome, GateStats, ImportGate};
pub use resolution::ResolutionService;
pub use statistics::{ResolutionStatistics, UserActivity};
