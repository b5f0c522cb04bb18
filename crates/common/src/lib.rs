//! PalmCursor Common Utilities
//!
//! Shared infrastructure for all PalmCursor crates:
//! - Error types and result aliases
//! - Timestamp ordering guard for frame streams
//! - Tracing/logging initialization
//! - Configuration file loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
