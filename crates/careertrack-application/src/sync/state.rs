//! State owned by the sync manager.

use careertrack_core::application::ApplicationRecord;
use careertrack_core::session::IdentityMode;
use serde::Serialize;
use tokio::task::JoinHandle;

/// What the presentation layer sees, republished on every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncView {
    pub records: Vec<ApplicationRecord>,
    pub loading: bool,
    pub mode: IdentityMode,
}

/// Aborts the wrapped task when dropped.
pub(crate) struct TaskGuard(JoinHandle<()>);

impl TaskGuard {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self(handle)
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A live remote subscription and the generation it was opened under.
pub(crate) struct RemoteSubscription {
    pub(crate) generation: u64,
    pub(crate) _forwarder: TaskGuard,
}

pub(crate) struct SyncState {
    pub(crate) records: Vec<ApplicationRecord>,
    pub(crate) loading: bool,
    pub(crate) mode: IdentityMode,
    pub(crate) subscription: Option<RemoteSubscription>,
    /// Bumped on every identity switch. Snapshots tagged with an older
    /// generation are discarded.
    pub(crate) generation: u64,
}

impl SyncState {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
            loading: true,
            mode: IdentityMode::None,
            subscription: None,
            generation: 0,
        }
    }

    /// Ends the current subscription and invalidates anything it still has
    /// in flight. Returns the new generation.
    pub(crate) fn end_subscription(&mut self) -> u64 {
        if let Some(subscription) = self.subscription.take() {
            tracing::debug!(
                "[SyncManager] Ending remote subscription (generation {})",
                subscription.generation
            );
        }
        self.generation += 1;
        self.generation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub(crate) fn view(&self) -> SyncView {
        SyncView {
            records: self.records.clone(),
            loading: self.loading,
            mode: self.mode.clone(),
        }
    }
}
