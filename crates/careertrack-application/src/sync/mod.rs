//! Record synchronization.
//!
//! Keeps one active record set in memory, sourced either from the signed-in
//! user's remote collection or from the local guest blob, and routes every
//! mutation to the backend that owns the record.

mod manager;
mod options;
mod state;

pub use manager::SyncManager;
pub use options::SyncOptions;
pub use state::SyncView;
