//! In-memory guest store.
//!
//! Holds the blob as serialized JSON text, the way browser local storage
//! holds a string, so parse failures and write failures can be reproduced.

use async_trait::async_trait;
use careertrack_core::application::{ApplicationRecord, LocalStore, RecordOrigin};
use careertrack_core::error::{Result, TrackerError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct InMemoryLocalStore {
    blob: Arc<Mutex<Option<String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `raw` as the stored blob, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(raw.into()))),
            ..Self::default()
        }
    }

    /// Makes every subsequent write (and clear) fail like a full quota.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The stored blob text, if any.
    pub async fn raw(&self) -> Option<String> {
        self.blob.lock().await.clone()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TrackerError::io("storage quota exceeded"));
        }
        Ok(())
    }
}

#[async_trait]
impl LocalStore for InMemoryLocalStore {
    async fn read_all(&self) -> Result<Option<Vec<ApplicationRecord>>> {
        let blob = self.blob.lock().await;
        let Some(raw) = blob.as_deref() else {
            return Ok(None);
        };
        let mut records: Vec<ApplicationRecord> = serde_json::from_str(raw)?;
        for record in &mut records {
            record.origin = RecordOrigin::Local;
        }
        Ok(Some(records))
    }

    async fn write_all(&self, records: &[ApplicationRecord]) -> Result<()> {
        self.check_writable()?;
        let raw = serde_json::to_string(records)
            .map_err(|e| TrackerError::io(format!("failed to serialize blob: {}", e)))?;
        *self.blob.lock().await = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.check_writable()?;
        *self.blob.lock().await = None;
        Ok(())
    }
}
