//! Application domain module.
//!
//! This module contains the application record model, the inputs used to
//! create and edit records, the storage ports, and the derived views.
//!
//! # Module Structure
//!
//! - `model`: `ApplicationRecord` and its value objects
//! - `input`: `NewApplication` and `ApplicationPatch`
//! - `repository`: `RemoteStore` and `LocalStore` ports
//! - `follow_up`: staleness rule
//! - `stats`: dashboard totals, per-status counts and filtering

pub mod follow_up;
mod input;
pub mod model;
mod repository;
mod stats;

pub use follow_up::{DEFAULT_FOLLOW_UP_AFTER_DAYS, needing_follow_up, needs_follow_up};
pub use input::{ApplicationPatch, MAX_NAME_LEN, NewApplication};
pub use model::{
    ApplicationFields, ApplicationRecord, ApplicationSource, ApplicationStatus, LOCAL_ID_PREFIX,
    RecordId, RecordOrigin,
};
pub use repository::{LocalStore, NewDocument, RemoteStore, Snapshot, SnapshotStream};
pub use stats::{ApplicationStats, StatusCounts, filter_by_status};
