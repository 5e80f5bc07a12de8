//! # Rollcall Common Library
//!
//! Shared code for the rollcall troop-management tools:
//! - Error and result types
//! - Configuration loading and data folder resolution
//! - Database bootstrap for the shared schema (roster, badge
//!   assignments, settings)

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
