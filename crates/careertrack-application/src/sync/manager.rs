use careertrack_core::application::{
    ApplicationPatch, ApplicationRecord, ApplicationStats, ApplicationStatus, LocalStore,
    NewApplication, NewDocument, RecordId, RecordOrigin, RemoteStore, Snapshot, SnapshotStream,
    StatusCounts, filter_by_status, needing_follow_up,
};
use careertrack_core::clock::Clock;
use careertrack_core::error::{Result, TrackerError};
use careertrack_core::session::{IdentityKey, IdentityMode, SessionChange, SessionObserver};
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, watch};

use super::options::SyncOptions;
use super::state::{RemoteSubscription, SyncState, SyncView, TaskGuard};

/// Keeps the active record set in sync with whichever backend owns it.
///
/// `SyncManager` is responsible for:
/// - Following the session signal and switching between the remote
///   collection and the local guest blob
/// - Routing add / update / delete to the backend that owns the record
/// - Republishing the record list, loading flag and mode to subscribers
/// - Deriving follow-ups and statistics from the current list
///
/// The manager is cheap to clone; clones share state. Background tasks hold
/// only weak references, so dropping the last clone stops them.
#[derive(Clone)]
pub struct SyncManager {
    inner: Arc<SyncInner>,
}

struct SyncInner {
    state: Mutex<SyncState>,
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
    clock: Arc<dyn Clock>,
    options: SyncOptions,
    view: watch::Sender<SyncView>,
    session_task: StdMutex<Option<TaskGuard>>,
}

/// Which backend a mutation of an existing record goes to.
enum Route {
    /// Record belongs to the guest set, which is the active set.
    ActiveLocal,
    /// Record is in the stored guest blob while a user is signed in.
    InactiveLocal(Vec<ApplicationRecord>),
    Remote,
}

impl SyncManager {
    /// Creates a manager with no active identity. Call [`start`](Self::start)
    /// to begin following a session.
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalStore>,
        clock: Arc<dyn Clock>,
        options: SyncOptions,
    ) -> Self {
        let state = SyncState::new();
        let (view, _) = watch::channel(state.view());
        Self {
            inner: Arc::new(SyncInner {
                state: Mutex::new(state),
                remote,
                local,
                clock,
                options,
                view,
                session_task: StdMutex::new(None),
            }),
        }
    }

    /// Subscribes to `observer` and applies its current state before
    /// returning. Later transitions are applied in the background.
    ///
    /// Calling `start` again replaces the previous session subscription.
    pub async fn start(&self, observer: &dyn SessionObserver) {
        let mut changes = observer.subscribe();
        let initial = changes.recv().await.unwrap_or(SessionChange::SignedOut);
        self.inner.handle_session_change(initial).await;

        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            while let Some(change) = changes.recv().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                inner.handle_session_change(change).await;
            }
            tracing::debug!("[SyncManager] Session stream closed");
        });
        *self.inner.session_task() = Some(TaskGuard::new(handle));
    }

    /// Stops following the session and ends the remote subscription.
    ///
    /// The last published view stays readable.
    pub async fn shutdown(&self) {
        self.inner.session_task().take();
        let mut state = self.inner.state.lock().await;
        state.end_subscription();
        tracing::info!("[SyncManager] Shut down");
    }

    /// Adds a record to the active backend.
    ///
    /// Without a signed-in user the record is persisted to the local blob and
    /// appears in the list immediately; the first successful local add moves
    /// mode from none to guest. While signed in the record is created remotely
    /// and shows up through the subscription.
    ///
    /// # Errors
    ///
    /// - `TrackerError::Validation` for bad input; nothing is written
    /// - `TrackerError::Io` when the local write fails; list and mode are kept
    /// - `TrackerError::Persistence` / `TrackerError::Timeout` for remote
    ///   failures
    pub async fn add(&self, input: NewApplication) -> Result<ApplicationRecord> {
        input.validate()?;
        let fields = input.normalize(self.inner.clock.today());

        let mut state = self.inner.state.lock().await;
        match state.mode.identity().cloned() {
            None => {
                let record =
                    ApplicationRecord::new(RecordId::new_local(), RecordOrigin::Local, fields);
                let mut records = state.records.clone();
                records.push(record.clone());
                if let Err(e) = self.inner.local.write_all(&records).await {
                    tracing::warn!("[SyncManager] Failed to save guest record: {}", e);
                    return Err(e);
                }

                state.records = records;
                state.mode = state.mode.after_local_add();
                self.inner.publish(&state);
                tracing::debug!("[SyncManager] Added guest record {}", record.id);
                Ok(record)
            }
            Some(owner) => {
                drop(state);
                let document = NewDocument {
                    owner,
                    fields: fields.clone(),
                };
                let id = self
                    .inner
                    .remote_write("create", self.inner.remote.create(document))
                    .await?;
                tracing::debug!("[SyncManager] Created remote record {}", id);
                Ok(ApplicationRecord::new(id, RecordOrigin::Remote, fields))
            }
        }
    }

    /// Applies a partial update to the record with `id`.
    ///
    /// Guest records are merged and the whole blob rewritten. Remote records
    /// are patched in place; the change arrives through the subscription.
    ///
    /// # Errors
    ///
    /// `TrackerError::NotFound` when nobody is signed in and `id` is not in
    /// the guest set, plus the write errors described on [`add`](Self::add).
    pub async fn update(&self, id: &RecordId, patch: ApplicationPatch) -> Result<()> {
        patch.validate()?;

        let mut state = self.inner.state.lock().await;
        match self.inner.route(&state, id).await? {
            Route::ActiveLocal => {
                let mut records = state.records.clone();
                if let Some(record) = records.iter_mut().find(|r| &r.id == id) {
                    patch.apply_to(&mut record.fields);
                }
                self.inner.persist_local(&records).await?;
                state.records = records;
                self.inner.publish(&state);
                Ok(())
            }
            Route::InactiveLocal(mut stored) => {
                if let Some(record) = stored.iter_mut().find(|r| &r.id == id) {
                    patch.apply_to(&mut record.fields);
                }
                self.inner.persist_local(&stored).await
            }
            Route::Remote => {
                drop(state);
                self.inner
                    .remote_write("patch", self.inner.remote.patch(id, patch.into_remote()))
                    .await
            }
        }
    }

    /// Deletes the record with `id` from the backend that owns it.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        match self.inner.route(&state, id).await? {
            Route::ActiveLocal => {
                let records: Vec<_> = state
                    .records
                    .iter()
                    .filter(|r| &r.id != id)
                    .cloned()
                    .collect();
                self.inner.persist_local(&records).await?;
                state.records = records;
                self.inner.publish(&state);
                Ok(())
            }
            Route::InactiveLocal(mut stored) => {
                stored.retain(|r| &r.id != id);
                self.inner.persist_local(&stored).await
            }
            Route::Remote => {
                drop(state);
                self.inner
                    .remote_write("remove", self.inner.remote.remove(id))
                    .await
            }
        }
    }

    /// Uploads every stored guest record to the signed-in user's collection.
    ///
    /// Records move one at a time. Each is dropped from the guest blob as soon
    /// as its remote copy exists, so the blob only ever holds records that
    /// were not imported and a retry never uploads one twice. When the blob
    /// cannot be rewritten after a create, the remote copy is deleted again.
    /// The state lock is not held across remote calls; an identity switch
    /// stops the import before the next record.
    ///
    /// # Returns
    ///
    /// The number of records imported.
    ///
    /// # Errors
    ///
    /// - `TrackerError::Validation` when nobody is signed in
    /// - `TrackerError::Persistence` / `TrackerError::Timeout` when a create
    ///   fails or the identity changed during the import
    /// - `TrackerError::Io` when the guest blob cannot be rewritten
    pub async fn import_guest_records(&self) -> Result<usize> {
        let (owner, generation, pending) = {
            let state = self.inner.state.lock().await;
            let owner = state.mode.identity().cloned().ok_or_else(|| {
                TrackerError::validation("guest records can only be imported while signed in")
            })?;
            let Some(stored) = self.inner.local.read_all().await? else {
                return Ok(0);
            };
            let pending: Vec<RecordId> = stored.into_iter().map(|record| record.id).collect();
            (owner, state.generation, pending)
        };

        let mut imported = 0;
        for id in &pending {
            let Some(record) = self.inner.guest_record_to_import(generation, id).await? else {
                continue;
            };
            let document = NewDocument {
                owner: owner.clone(),
                fields: record.fields,
            };
            let remote_id = match self
                .inner
                .remote_write("import", self.inner.remote.create(document))
                .await
            {
                Ok(remote_id) => remote_id,
                Err(e) => {
                    tracing::warn!(
                        "[SyncManager] Guest import stopped after {} of {} records",
                        imported,
                        pending.len()
                    );
                    return Err(e);
                }
            };

            if let Err(e) = self.inner.forget_guest_record(id).await {
                tracing::warn!("[SyncManager] Undoing import of {}: {}", id, e);
                if let Err(remove_err) = self
                    .inner
                    .remote_write("remove", self.inner.remote.remove(&remote_id))
                    .await
                {
                    tracing::error!(
                        "[SyncManager] Guest record {} now also exists remotely as {}: {}",
                        id,
                        remote_id,
                        remove_err
                    );
                }
                return Err(e);
            }
            imported += 1;
        }

        {
            let _state = self.inner.state.lock().await;
            if let Ok(Some(rest)) = self.inner.local.read_all().await
                && rest.is_empty()
                && let Err(e) = self.inner.local.clear().await
            {
                tracing::warn!("[SyncManager] Failed to remove empty guest blob: {}", e);
            }
        }
        tracing::info!("[SyncManager] Imported {} guest records for {}", imported, owner);
        Ok(imported)
    }

    /// The active record list.
    pub fn records(&self) -> Vec<ApplicationRecord> {
        self.inner.view.borrow().records.clone()
    }

    /// True until the active set has been loaded.
    pub fn is_loading(&self) -> bool {
        self.inner.view.borrow().loading
    }

    pub fn mode(&self) -> IdentityMode {
        self.inner.view.borrow().mode.clone()
    }

    /// Receives the current view and every later change.
    pub fn subscribe(&self) -> watch::Receiver<SyncView> {
        self.inner.view.subscribe()
    }

    /// Active records that are overdue for a follow-up, in list order.
    pub fn follow_ups(&self) -> Vec<ApplicationRecord> {
        let view = self.inner.view.borrow();
        needing_follow_up(
            &view.records,
            self.inner.clock.today(),
            self.inner.options.follow_up_after_days,
        )
    }

    pub fn stats(&self) -> ApplicationStats {
        let view = self.inner.view.borrow();
        ApplicationStats::compute(
            &view.records,
            self.inner.clock.today(),
            self.inner.options.follow_up_after_days,
        )
    }

    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::compute(&self.inner.view.borrow().records)
    }

    /// Active records with `status`, or all of them for `None`.
    pub fn filter_by_status(&self, status: Option<ApplicationStatus>) -> Vec<ApplicationRecord> {
        filter_by_status(&self.inner.view.borrow().records, status)
    }
}

impl SyncInner {
    async fn handle_session_change(self: &Arc<Self>, change: SessionChange) {
        match change {
            SessionChange::SignedIn(identity) => self.activate_remote(identity).await,
            SessionChange::SignedOut => self.activate_local().await,
        }
    }

    async fn activate_remote(self: &Arc<Self>, identity: IdentityKey) {
        let generation = {
            let mut state = self.state.lock().await;
            if state.mode.identity() == Some(&identity) && state.subscription.is_some() {
                tracing::debug!("[SyncManager] Already following {}", identity);
                return;
            }

            let generation = state.end_subscription();
            state.mode = IdentityMode::Authenticated(identity.clone());
            state.records.clear();
            state.loading = true;
            self.publish(&state);
            generation
        };
        tracing::info!("[SyncManager] Following remote records for {}", identity);

        let stream = match self.remote.watch(&identity).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("[SyncManager] Failed to subscribe for {}: {}", identity, e);
                self.finish_loading(generation).await;
                return;
            }
        };

        let forwarder = TaskGuard::new(tokio::spawn(forward_snapshots(
            Arc::downgrade(self),
            generation,
            stream,
            self.options.remote_timeout,
        )));

        let mut state = self.state.lock().await;
        if state.is_current(generation) {
            state.subscription = Some(RemoteSubscription {
                generation,
                _forwarder: forwarder,
            });
        }
    }

    async fn activate_local(&self) {
        let mut state = self.state.lock().await;
        state.end_subscription();

        match self.local.read_all().await {
            Ok(Some(records)) => {
                tracing::info!("[SyncManager] Loaded {} guest records", records.len());
                state.mode = IdentityMode::Guest;
                state.records = records;
            }
            Ok(None) => {
                state.mode = IdentityMode::None;
                state.records.clear();
            }
            Err(e) => {
                tracing::warn!("[SyncManager] Ignoring unreadable guest data: {}", e);
                state.mode = IdentityMode::None;
                state.records.clear();
            }
        }
        state.loading = false;
        self.publish(&state);
    }

    async fn apply_snapshot(&self, generation: u64, snapshot: Snapshot) {
        let mut state = self.state.lock().await;
        if !state.is_current(generation) {
            tracing::debug!("[SyncManager] Discarding snapshot from generation {}", generation);
            return;
        }

        match snapshot {
            Ok(records) => {
                state.records = records
                    .into_iter()
                    .map(|mut record| {
                        record.origin = RecordOrigin::Remote;
                        record
                    })
                    .collect();
            }
            Err(e) => tracing::error!("[SyncManager] Remote snapshot failed: {}", e),
        }
        state.loading = false;
        self.publish(&state);
    }

    async fn finish_loading(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if state.is_current(generation) && state.loading {
            state.loading = false;
            self.publish(&state);
        }
    }

    async fn route(&self, state: &SyncState, id: &RecordId) -> Result<Route> {
        if let Some(record) = state.records.iter().find(|r| &r.id == id) {
            return Ok(match record.origin {
                RecordOrigin::Local => Route::ActiveLocal,
                RecordOrigin::Remote => Route::Remote,
            });
        }
        if !state.mode.is_authenticated() {
            return Err(TrackerError::not_found("application", id.as_str()));
        }

        match self.local.read_all().await {
            Ok(Some(stored)) if stored.iter().any(|r| &r.id == id) => {
                Ok(Route::InactiveLocal(stored))
            }
            Ok(_) => Ok(Route::Remote),
            Err(e) => {
                tracing::debug!("[SyncManager] Guest data unreadable while routing: {}", e);
                Ok(Route::Remote)
            }
        }
    }

    /// The guest record `id` as currently stored, if the import that began
    /// under `generation` may still proceed.
    async fn guest_record_to_import(
        &self,
        generation: u64,
        id: &RecordId,
    ) -> Result<Option<ApplicationRecord>> {
        let state = self.state.lock().await;
        if !state.is_current(generation) {
            return Err(TrackerError::persistence(
                "identity changed during guest import",
            ));
        }
        let stored = self.local.read_all().await?.unwrap_or_default();
        Ok(stored.into_iter().find(|record| &record.id == id))
    }

    /// Drops `id` from the guest blob.
    async fn forget_guest_record(&self, id: &RecordId) -> Result<()> {
        let _state = self.state.lock().await;
        let Some(mut stored) = self.local.read_all().await? else {
            return Ok(());
        };
        stored.retain(|record| &record.id != id);
        self.persist_local(&stored).await
    }

    async fn persist_local(&self, records: &[ApplicationRecord]) -> Result<()> {
        self.local.write_all(records).await.inspect_err(|e| {
            tracing::warn!("[SyncManager] Failed to save guest records: {}", e);
        })
    }

    /// Awaits a remote write, bounded by the configured timeout.
    async fn remote_write<T>(
        &self,
        operation: &str,
        write: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.options.remote_timeout, write).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!("[SyncManager] Remote {} failed: {}", operation, e);
                Err(e)
            }
            Err(_) => {
                tracing::error!(
                    "[SyncManager] Remote {} timed out after {:?}",
                    operation,
                    self.options.remote_timeout
                );
                Err(TrackerError::Timeout(self.options.remote_timeout))
            }
        }
    }

    fn publish(&self, state: &SyncState) {
        self.view.send_replace(state.view());
    }

    fn session_task(&self) -> MutexGuard<'_, Option<TaskGuard>> {
        self.session_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Applies snapshots from `stream` until it closes or the manager is gone.
async fn forward_snapshots(
    inner: Weak<SyncInner>,
    generation: u64,
    mut stream: SnapshotStream,
    first_snapshot_timeout: Duration,
) {
    let mut next = match tokio::time::timeout(first_snapshot_timeout, stream.recv()).await {
        Ok(snapshot) => snapshot,
        Err(_) => {
            tracing::warn!(
                "[SyncManager] No snapshot within {:?}, still waiting",
                first_snapshot_timeout
            );
            if let Some(inner) = inner.upgrade() {
                inner.finish_loading(generation).await;
            }
            stream.recv().await
        }
    };

    while let Some(snapshot) = next {
        let Some(manager) = inner.upgrade() else {
            return;
        };
        manager.apply_snapshot(generation, snapshot).await;
        drop(manager);
        next = stream.recv().await;
    }

    tracing::debug!("[SyncManager] Remote subscription {} closed", generation);
    if let Some(inner) = inner.upgrade() {
        inner.finish_loading(generation).await;
    }
}
