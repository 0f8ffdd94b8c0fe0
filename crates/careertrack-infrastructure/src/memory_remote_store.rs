//! In-process remote document store.
//!
//! A per-owner document collection with live snapshot push, standing in for
//! a hosted document database. Useful for local runs and for exercising the
//! sync manager against a store that behaves like the real one: server-side
//! timestamps, ordered snapshots, echo of every commit to every watcher.

use async_trait::async_trait;
use careertrack_core::application::{
    ApplicationFields, ApplicationPatch, ApplicationRecord, NewDocument, RecordId, RecordOrigin,
    RemoteStore, SnapshotStream,
};
use careertrack_core::error::{Result, TrackerError};
use careertrack_core::session::IdentityKey;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

/// A document as the store keeps it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: RecordId,
    pub owner: IdentityKey,
    pub fields: ApplicationFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredDocument {
    fn to_record(&self) -> ApplicationRecord {
        ApplicationRecord::new(self.id.clone(), RecordOrigin::Remote, self.fields.clone())
    }
}

struct Watcher {
    owner: IdentityKey,
    sender: mpsc::UnboundedSender<careertrack_core::application::Snapshot>,
}

#[derive(Default)]
struct Collection {
    documents: Vec<StoredDocument>,
    watchers: Vec<Watcher>,
    reject_writes: Option<String>,
    write_delay: Option<Duration>,
    /// Creates still accepted before every further create is rejected.
    create_budget: Option<usize>,
}

impl Collection {
    /// Newest submission first; ties keep creation order.
    fn snapshot_for(&self, owner: &IdentityKey) -> Vec<ApplicationRecord> {
        let mut docs: Vec<&StoredDocument> = self
            .documents
            .iter()
            .filter(|doc| &doc.owner == owner)
            .collect();
        docs.sort_by(|a, b| b.fields.submission_date.cmp(&a.fields.submission_date));
        docs.into_iter().map(StoredDocument::to_record).collect()
    }

    fn publish(&mut self, owner: &IdentityKey) {
        let snapshot = self.snapshot_for(owner);
        self.watchers.retain(|watcher| {
            if &watcher.owner != owner {
                return !watcher.sender.is_closed();
            }
            watcher.sender.send(Ok(snapshot.clone())).is_ok()
        });
    }

    fn check_writable(&self) -> Result<()> {
        match &self.reject_writes {
            Some(reason) => Err(TrackerError::persistence(reason.clone())),
            None => Ok(()),
        }
    }
}

/// `RemoteStore` kept in process memory.
#[derive(Clone, Default)]
pub struct InMemoryRemoteStore {
    collection: Arc<Mutex<Collection>>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every subsequent write with `reason`; `None` accepts again.
    pub async fn set_reject_writes(&self, reason: Option<&str>) {
        self.collection.lock().await.reject_writes = reason.map(str::to_string);
    }

    /// Accepts the next `allowed` creates, then rejects creates until the
    /// budget is lifted with `None`.
    pub async fn set_create_budget(&self, allowed: Option<usize>) {
        self.collection.lock().await.create_budget = allowed;
    }

    /// Delays every subsequent write, to reproduce a stalled backend.
    pub async fn set_write_delay(&self, delay: Option<Duration>) {
        self.collection.lock().await.write_delay = delay;
    }

    /// All documents owned by `owner`, in snapshot order.
    pub async fn documents(&self, owner: &IdentityKey) -> Vec<StoredDocument> {
        let collection = self.collection.lock().await;
        let mut docs: Vec<StoredDocument> = collection
            .documents
            .iter()
            .filter(|doc| &doc.owner == owner)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.fields.submission_date.cmp(&a.fields.submission_date));
        docs
    }

    /// Total number of documents across owners.
    pub async fn len(&self) -> usize {
        self.collection.lock().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Open subscriptions for `owner`. Cancelled ones are not counted.
    pub async fn watcher_count(&self, owner: &IdentityKey) -> usize {
        let mut collection = self.collection.lock().await;
        collection.watchers.retain(|w| !w.sender.is_closed());
        collection
            .watchers
            .iter()
            .filter(|w| &w.owner == owner)
            .count()
    }

    /// Sends a query error to every watcher of `owner`.
    pub async fn push_error(&self, owner: &IdentityKey, reason: &str) {
        let collection = self.collection.lock().await;
        for watcher in collection.watchers.iter().filter(|w| &w.owner == owner) {
            let _ = watcher
                .sender
                .send(Err(TrackerError::persistence(reason.to_string())));
        }
    }

    async fn wait_write_delay(&self) {
        let delay = self.collection.lock().await.write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn watch(&self, owner: &IdentityKey) -> Result<SnapshotStream> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut collection = self.collection.lock().await;
        // The current set is pushed right away, like a first query result.
        let _ = sender.send(Ok(collection.snapshot_for(owner)));
        collection.watchers.push(Watcher {
            owner: owner.clone(),
            sender,
        });
        tracing::debug!("[InMemoryRemoteStore] Watching records of {}", owner);
        Ok(receiver)
    }

    async fn create(&self, document: NewDocument) -> Result<RecordId> {
        self.wait_write_delay().await;
        let mut collection = self.collection.lock().await;
        collection.check_writable()?;
        match collection.create_budget {
            Some(0) => return Err(TrackerError::persistence("create quota exhausted")),
            Some(remaining) => collection.create_budget = Some(remaining - 1),
            None => {}
        }

        let id = RecordId::new(Uuid::new_v4().simple().to_string());
        let owner = document.owner.clone();
        collection.documents.push(StoredDocument {
            id: id.clone(),
            owner: document.owner,
            fields: document.fields,
            created_at: Utc::now(),
            updated_at: None,
        });
        collection.publish(&owner);
        Ok(id)
    }

    async fn patch(&self, id: &RecordId, patch: ApplicationPatch) -> Result<()> {
        self.wait_write_delay().await;
        let mut collection = self.collection.lock().await;
        collection.check_writable()?;

        let doc = collection
            .documents
            .iter_mut()
            .find(|doc| &doc.id == id)
            .ok_or_else(|| TrackerError::persistence(format!("no document '{}'", id)))?;
        patch.apply_to(&mut doc.fields);
        doc.updated_at = Some(Utc::now());
        let owner = doc.owner.clone();
        collection.publish(&owner);
        Ok(())
    }

    async fn remove(&self, id: &RecordId) -> Result<()> {
        self.wait_write_delay().await;
        let mut collection = self.collection.lock().await;
        collection.check_writable()?;

        let Some(index) = collection.documents.iter().position(|doc| &doc.id == id) else {
            // Deleting a missing document succeeds, as document stores do.
            return Ok(());
        };
        let removed = collection.documents.remove(index);
        collection.publish(&removed.owner);
        Ok(())
    }
}
