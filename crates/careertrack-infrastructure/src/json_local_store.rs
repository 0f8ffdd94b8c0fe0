//! File-backed guest store.
//!
//! Keeps the guest record list as a single JSON array blob, replaced
//! atomically on every write.

use crate::paths::CareerTrackPaths;
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use careertrack_core::application::{ApplicationRecord, LocalStore, RecordOrigin};
use careertrack_core::error::{Result, TrackerError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// `LocalStore` backed by one JSON file.
///
/// # Example
///
/// ```ignore
/// use careertrack_infrastructure::JsonFileLocalStore;
///
/// let store = JsonFileLocalStore::new()?;
/// let records = store.read_all().await?;
/// ```
#[derive(Clone)]
pub struct JsonFileLocalStore {
    file: Arc<AtomicJsonFile<Vec<ApplicationRecord>>>,
}

impl JsonFileLocalStore {
    /// Creates a store at the default guest file location.
    pub fn new() -> Result<Self> {
        let path = CareerTrackPaths::new(None).guest_file()?;
        Ok(Self::with_path(path))
    }

    /// Creates a store at an explicit path (used by tests and config overrides).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&AtomicJsonFile<Vec<ApplicationRecord>>) -> Result<T> + Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || op(&file))
            .await
            .map_err(|e| TrackerError::internal(format!("Failed to join task: {}", e)))?
    }
}

#[async_trait]
impl LocalStore for JsonFileLocalStore {
    async fn read_all(&self) -> Result<Option<Vec<ApplicationRecord>>> {
        let records = self.run_blocking(|file| Ok(file.load()?)).await?;

        // Everything in this blob is local, whatever older writers recorded.
        Ok(records.map(|records| {
            records
                .into_iter()
                .map(|mut record| {
                    record.origin = RecordOrigin::Local;
                    record
                })
                .collect()
        }))
    }

    async fn write_all(&self, records: &[ApplicationRecord]) -> Result<()> {
        let records = records.to_vec();
        let count = records.len();
        self.run_blocking(move |file| Ok(file.save(&records)?))
            .await?;
        tracing::debug!(
            "[JsonFileLocalStore] Wrote {} records to {:?}",
            count,
            self.path()
        );
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.run_blocking(|file| Ok(file.remove()?)).await?;
        tracing::debug!("[JsonFileLocalStore] Cleared {:?}", self.path());
        Ok(())
    }
}
