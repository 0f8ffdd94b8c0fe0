//! Storage ports for application records.
//!
//! Defines the two backends the sync manager coordinates: a remote per-user
//! document collection and a local single-blob guest store.

use super::input::ApplicationPatch;
use super::model::{ApplicationFields, ApplicationRecord, RecordId};
use crate::error::Result;
use crate::session::IdentityKey;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One push from a live remote subscription: the full ordered record set,
/// or the error the backend reported for the query.
pub type Snapshot = Result<Vec<ApplicationRecord>>;

/// Live remote subscription. Dropping the receiver cancels it.
pub type SnapshotStream = mpsc::UnboundedReceiver<Snapshot>;

/// A document to be created in the remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    /// Identity the document is scoped to.
    pub owner: IdentityKey,
    pub fields: ApplicationFields,
}

/// The remote per-user document collection.
///
/// # Implementation Notes
///
/// Implementations should:
/// - stamp `created_at` on create and `updated_at` on patch with the
///   store's own clock
/// - push a fresh snapshot to every watcher of the owner after each commit,
///   including commits made through this same handle
/// - order snapshots by submission date, newest first
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Opens a live subscription to `owner`'s records.
    ///
    /// The current set is pushed as soon as it is available.
    async fn watch(&self, owner: &IdentityKey) -> Result<SnapshotStream>;

    /// Creates a document and returns the id the store assigned.
    ///
    /// # Errors
    ///
    /// `TrackerError::Persistence` when the store rejects the write.
    async fn create(&self, document: NewDocument) -> Result<RecordId>;

    /// Applies a partial update to an existing document.
    ///
    /// # Errors
    ///
    /// `TrackerError::Persistence` when the store rejects the write or the
    /// document does not exist.
    async fn patch(&self, id: &RecordId, patch: ApplicationPatch) -> Result<()>;

    /// Deletes a document.
    ///
    /// # Errors
    ///
    /// `TrackerError::Persistence` when the store rejects the delete.
    async fn remove(&self, id: &RecordId) -> Result<()>;
}

/// Durable local storage for the guest record set.
///
/// The whole list is stored as one blob under a fixed key; there is no
/// per-record access.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Reads the stored list.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(records))`: a list was stored (possibly empty)
    /// - `Ok(None)`: nothing stored yet
    /// - `Err(TrackerError::Parse { .. })`: the blob is malformed
    /// - `Err(TrackerError::Io { .. })`: the blob could not be read
    async fn read_all(&self) -> Result<Option<Vec<ApplicationRecord>>>;

    /// Replaces the stored list.
    ///
    /// Either the whole list is written or the previous blob stays intact.
    async fn write_all(&self, records: &[ApplicationRecord]) -> Result<()>;

    /// Removes the blob entirely.
    async fn clear(&self) -> Result<()>;
}
