//! Postcraft Common Utilities
//!
//! Shared infrastructure for all Postcraft crates:
//! - Error types and result aliases
//! - Clock abstraction for timestamps, ids, and export filenames
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
