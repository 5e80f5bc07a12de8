//! Database bootstrap for the shared rollcall schema

pub mod init;

pub use init::*;
