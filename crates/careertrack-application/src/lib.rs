//! Application layer for careertrack.
//!
//! Coordinates the session signal, the remote collection and the local guest
//! store behind a single [`SyncManager`].

pub mod sync;

pub use sync::{SyncManager, SyncOptions, SyncView};
