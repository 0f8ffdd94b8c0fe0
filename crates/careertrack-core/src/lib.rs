//! Domain layer for careertrack.
//!
//! Application records, identity modes, the storage and session ports, and
//! the pure views (follow-ups, stats) computed over a record list.

pub mod application;
pub mod clock;
pub mod config;
pub mod error;
pub mod session;

// Re-export common error type
pub use error::{Result, TrackerError};
