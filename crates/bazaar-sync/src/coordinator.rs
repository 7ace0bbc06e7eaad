//! # Sync Coordinator
//!
//! Owns one listener worker per collection and the pull-to-refresh path.
//!
//! ## Worker Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Per-Collection State Machine                         │
//! │                                                                         │
//! │   ┌──────┐ start_sync ┌─────────────┐ listen ok ┌───────────┐           │
//! │   │ Idle │ ─────────► │ Subscribing │ ────────► │ Streaming │ ◄─┐       │
//! │   └──────┘            └─────────────┘           └─────┬─────┘   │       │
//! │      ▲                       │ listen err             │ snapshot│       │
//! │      │ stop_sync             │                        │ applied ┘       │
//! │      │                       ▼                        │                 │
//! │      │                  ┌────────┐  listener error /  │                 │
//! │      └───────────────── │ Failed │ ◄── channel closed ┘                 │
//! │                         └────────┘                                      │
//! │                             │ start_sync (resubscribe)                  │
//! │                             └──────────► Subscribing                    │
//! │                                                                         │
//! │  A failed listener emits SyncFailed(stream_failed) once and is not      │
//! │  retried until start_sync is called again. A cache write that fails     │
//! │  while streaming emits the same notice but keeps the listener.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Task Model
//! - Every collection runs in its own `tokio::spawn`, so one failing or
//!   panicking worker leaves the others streaming.
//! - Snapshots for a collection are applied one at a time in delivery order.
//! - Aborting a worker drops its [`SnapshotStream`], which removes the
//!   remote listener.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use futures_util::StreamExt;

use bazaar_core::{Collection, Product, SyncStateEntry, User};
use bazaar_db::Database;

use crate::apply::{apply_documents, ApplyReport};
use crate::config::{Notices, SyncConfig};
use crate::error::{SyncError, SyncResult};
use crate::events::{SyncEvent, SyncEventBus, SyncEventReceiver};
use crate::listener::SnapshotStream;
use crate::reader::CacheReader;
use crate::remote::RemoteBackend;

// =============================================================================
// Collection State
// =============================================================================

/// Where a collection's listener is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionState {
    /// No worker running.
    Idle,
    /// Attaching the remote listener.
    Subscribing,
    /// Listener attached, applying snapshots.
    Streaming,
    /// Listener died. Waits for the next `start_sync`.
    Failed,
}

impl std::fmt::Display for CollectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionState::Idle => write!(f, "idle"),
            CollectionState::Subscribing => write!(f, "subscribing"),
            CollectionState::Streaming => write!(f, "streaming"),
            CollectionState::Failed => write!(f, "failed"),
        }
    }
}

/// Snapshot of one collection for status screens.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStatus {
    pub collection: Collection,
    pub state: CollectionState,
    /// `None` until the collection first syncs or fails.
    pub bookkeeping: Option<SyncStateEntry>,
}

// =============================================================================
// Worker
// =============================================================================

/// Everything a collection worker needs, moved into its task.
struct Worker {
    collection: Collection,
    db: Database,
    backend: Arc<dyn RemoteBackend>,
    events: SyncEventBus,
    notices: Notices,
    state: Arc<watch::Sender<CollectionState>>,
}

impl Worker {
    async fn run(self) {
        info!("Sync worker starting");
        self.state.send_replace(CollectionState::Subscribing);

        let mut stream = match SnapshotStream::open(self.backend.as_ref(), self.collection) {
            Ok(stream) => stream,
            Err(e) => {
                self.fail(e.into()).await;
                return;
            }
        };

        self.state.send_replace(CollectionState::Streaming);
        debug!("Listener attached");

        let cause = loop {
            match stream.next().await {
                Some(Ok(documents)) => {
                    debug!(count = documents.len(), "Snapshot received");
                    if let Err(e) = apply_documents(&self.db, self.collection, &documents).await {
                        error!(error = %e, "Failed to apply snapshot, keeping listener");
                        self.record_failure(&e).await;
                        self.emit_notice();
                    }
                }
                Some(Err(e)) => break SyncError::from(e),
                None => {
                    break SyncError::ListenerClosed {
                        collection: self.collection,
                    }
                }
            }
        };

        // Deregister before reporting so observers never see Failed with a
        // listener still attached.
        drop(stream);
        self.fail(cause).await;
    }

    async fn fail(&self, cause: SyncError) {
        error!(error = %cause, "Sync listener failed");
        self.record_failure(&cause).await;
        self.state.send_replace(CollectionState::Failed);
        self.emit_notice();
    }

    async fn record_failure(&self, cause: &SyncError) {
        if let Err(e) = self
            .db
            .sync_state()
            .record_failure(self.collection, &cause.to_string())
            .await
        {
            warn!(error = %e, "Could not record sync failure");
        }
    }

    fn emit_notice(&self) {
        self.events
            .emit(SyncEvent::SyncFailed(self.notices.stream_failed.clone()));
    }
}

// =============================================================================
// Sync Coordinator
// =============================================================================

/// Keeps the cache in step with the remote collections.
///
/// ```rust,ignore
/// let coordinator = SyncCoordinator::new(db, Arc::new(backend), config);
/// let mut failures = coordinator.subscribe_events();
/// coordinator.start_sync();
///
/// // pull-to-refresh
/// coordinator.manual_sync().await;
/// ```
pub struct SyncCoordinator {
    db: Database,
    backend: Arc<dyn RemoteBackend>,
    config: Arc<SyncConfig>,
    events: SyncEventBus,
    states: BTreeMap<Collection, Arc<watch::Sender<CollectionState>>>,
    workers: Mutex<HashMap<Collection, JoinHandle<()>>>,
}

impl SyncCoordinator {
    /// Creates a coordinator with every configured collection `Idle`.
    pub fn new(db: Database, backend: Arc<dyn RemoteBackend>, config: SyncConfig) -> Self {
        let events = SyncEventBus::new(config.sync.event_buffer);
        let states = config
            .collections()
            .iter()
            .map(|&collection| {
                let (tx, _) = watch::channel(CollectionState::Idle);
                (collection, Arc::new(tx))
            })
            .collect();

        SyncCoordinator {
            db,
            backend,
            config: Arc::new(config),
            events,
            states,
            workers: Mutex::new(HashMap::new()),
        }
    }

    fn workers(&self) -> MutexGuard<'_, HashMap<Collection, JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Continuous Sync
    // =========================================================================

    /// Starts a listener worker for every configured collection that lacks
    /// a live one. Calling it again while workers stream is a no-op; a
    /// collection in `Failed` is resubscribed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_sync(&self) {
        let mut workers = self.workers();

        for &collection in self.config.collections() {
            let Some(state) = self.states.get(&collection) else {
                continue;
            };

            if let Some(handle) = workers.get(&collection) {
                let failed = *state.borrow() == CollectionState::Failed;
                if !handle.is_finished() && !failed {
                    debug!(collection = %collection, "Worker already running");
                    continue;
                }
                handle.abort();
            }

            let worker = Worker {
                collection,
                db: self.db.clone(),
                backend: Arc::clone(&self.backend),
                events: self.events.clone(),
                notices: self.config.notices.clone(),
                state: Arc::clone(state),
            };

            state.send_replace(CollectionState::Subscribing);
            let span = info_span!("sync_worker", collection = %collection);
            workers.insert(collection, tokio::spawn(worker.run().instrument(span)));
        }

        info!(workers = workers.len(), "Sync started");
    }

    /// Aborts every worker and waits for it to finish, so all remote
    /// listeners are detached when this returns. Stopped collections go
    /// back to `Idle`.
    pub async fn stop_sync(&self) {
        let handles: Vec<(Collection, JoinHandle<()>)> = self.workers().drain().collect();

        for (_, handle) in &handles {
            handle.abort();
        }

        let mut stopped = Vec::with_capacity(handles.len());
        for (collection, handle) in handles {
            stopped.push(collection);
            if let Err(e) = handle.await {
                if e.is_panic() {
                    warn!(collection = %collection, "Sync worker had panicked");
                }
            }
        }

        // A start_sync that ran during the awaits owns its collections now.
        let workers = self.workers();
        for collection in stopped {
            if workers.contains_key(&collection) {
                continue;
            }
            if let Some(state) = self.states.get(&collection) {
                state.send_replace(CollectionState::Idle);
            }
        }

        info!("Sync stopped");
    }

    // =========================================================================
    // Manual Sync
    // =========================================================================

    /// Pull-to-refresh: fetches and applies every configured collection in
    /// order. Stops at the first failure and reports it as a single
    /// `SyncFailed(refresh_failed)` event. Never returns an error.
    pub async fn manual_sync(&self) {
        info!("Manual sync starting");

        for &collection in self.config.collections() {
            match self.refresh(collection).await {
                Ok(report) => {
                    debug!(
                        collection = %collection,
                        applied = report.applied,
                        skipped = report.skipped,
                        "Collection refreshed"
                    );
                }
                Err(e) => {
                    error!(collection = %collection, error = %e, "Manual sync failed");
                    if let Err(record_err) = self
                        .db
                        .sync_state()
                        .record_failure(collection, &e.to_string())
                        .await
                    {
                        warn!(error = %record_err, "Could not record sync failure");
                    }
                    self.events.emit(SyncEvent::SyncFailed(
                        self.config.notices.refresh_failed.clone(),
                    ));
                    return;
                }
            }
        }

        info!("Manual sync finished");
    }

    async fn refresh(&self, collection: Collection) -> SyncResult<ApplyReport> {
        let documents = self.backend.fetch_all(collection).await?;
        apply_documents(&self.db, collection, &documents).await
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Receiver for failure notices. Replays the most recent one.
    pub fn subscribe_events(&self) -> SyncEventReceiver {
        self.events.subscribe()
    }

    /// Current state, or `None` for a collection that is not configured.
    pub fn state(&self, collection: Collection) -> Option<CollectionState> {
        self.states.get(&collection).map(|tx| *tx.borrow())
    }

    /// Live state for one collection.
    pub fn watch_state(&self, collection: Collection) -> Option<watch::Receiver<CollectionState>> {
        self.states.get(&collection).map(|tx| tx.subscribe())
    }

    /// State and bookkeeping for every configured collection, in sync order.
    pub async fn status(&self) -> SyncResult<Vec<CollectionStatus>> {
        let repo = self.db.sync_state();
        let mut out = Vec::with_capacity(self.config.collections().len());

        for &collection in self.config.collections() {
            out.push(CollectionStatus {
                collection,
                state: self.state(collection).unwrap_or(CollectionState::Idle),
                bookkeeping: repo.get(collection).await?,
            });
        }

        Ok(out)
    }

    pub fn reader(&self) -> CacheReader {
        CacheReader::new(self.db.clone())
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    // =========================================================================
    // Direct Writes
    // =========================================================================

    /// Writes a product the user just created or edited, ahead of the
    /// listener echoing it back.
    pub async fn cache_product(&self, product: &Product) -> SyncResult<()> {
        self.db.products().upsert(product).await?;
        debug!(id = %product.id, "Cached product write");
        Ok(())
    }

    /// Writes the signed-in user's profile after an edit.
    pub async fn cache_user(&self, user: &User) -> SyncResult<()> {
        self.db.users().upsert(user).await?;
        debug!(id = %user.id, "Cached user write");
        Ok(())
    }

    /// Removes a product after the remote delete is confirmed.
    pub async fn forget_product(&self, id: &str) -> SyncResult<bool> {
        let removed = self.db.products().delete_by_id(id).await?;
        debug!(id = %id, removed, "Forgot product");
        Ok(removed)
    }

    /// Empties every cached table and the bookkeeping, for sign-out.
    pub async fn purge_cache(&self) -> SyncResult<()> {
        self.db.purge().await?;
        info!("Cache purged");
        Ok(())
    }
}

impl Drop for SyncCoordinator {
    fn drop(&mut self) {
        let workers = self.workers.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, handle) in workers.drain() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("collections", &self.config.collections())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MemoryBackend, RemoteError};
    use bazaar_db::{DbConfig, ProductFilter};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    async fn setup(collections: &[Collection]) -> (SyncCoordinator, MemoryBackend, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let backend = MemoryBackend::new();
        let mut config = SyncConfig::default();
        config.sync.collections = collections.to_vec();

        let coordinator = SyncCoordinator::new(db.clone(), Arc::new(backend.clone()), config);
        (coordinator, backend, db)
    }

    async fn wait_state(coordinator: &SyncCoordinator, collection: Collection, want: CollectionState) {
        let mut rx = coordinator.watch_state(collection).unwrap();
        timeout(WAIT, rx.wait_for(|s| *s == want))
            .await
            .unwrap()
            .unwrap();
    }

    async fn wait_products(db: &Database, pred: impl Fn(&[Product]) -> bool) -> Vec<Product> {
        let mut stream = db.products().observe(ProductFilter::All);
        timeout(WAIT, async {
            while let Some(batch) = stream.next().await {
                let batch = batch.unwrap();
                if pred(&batch) {
                    return batch;
                }
            }
            panic!("observe stream ended");
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_start_sync_streams_into_cache() {
        let (coordinator, backend, db) = setup(&[Collection::Products]).await;
        backend.set(Collection::Products, "p-1", json!({ "title": "Mug", "price": 3 }));

        coordinator.start_sync();
        wait_state(&coordinator, Collection::Products, CollectionState::Streaming).await;
        wait_products(&db, |rows| rows.len() == 1).await;

        backend.set(Collection::Products, "p-2", json!({ "title": "Lamp" }));
        let rows = wait_products(&db, |rows| rows.len() == 2).await;
        assert_eq!(rows[0].title, "Lamp");
    }

    #[tokio::test]
    async fn test_start_sync_is_idempotent() {
        let (coordinator, backend, _db) =
            setup(&[Collection::Products, Collection::Categories]).await;

        coordinator.start_sync();
        wait_state(&coordinator, Collection::Products, CollectionState::Streaming).await;
        wait_state(&coordinator, Collection::Categories, CollectionState::Streaming).await;

        coordinator.start_sync();
        coordinator.start_sync();
        wait_state(&coordinator, Collection::Products, CollectionState::Streaming).await;

        assert_eq!(backend.active_listeners(Collection::Products), 1);
        assert_eq!(backend.active_listeners(Collection::Categories), 1);
    }

    #[tokio::test]
    async fn test_stop_sync_detaches_listeners() {
        let (coordinator, backend, _db) =
            setup(&[Collection::Products, Collection::Categories]).await;

        coordinator.start_sync();
        wait_state(&coordinator, Collection::Products, CollectionState::Streaming).await;
        wait_state(&coordinator, Collection::Categories, CollectionState::Streaming).await;

        coordinator.stop_sync().await;
        assert_eq!(backend.active_listeners(Collection::Products), 0);
        assert_eq!(backend.active_listeners(Collection::Categories), 0);
        assert_eq!(coordinator.state(Collection::Products), Some(CollectionState::Idle));
    }

    #[tokio::test]
    async fn test_listener_error_fails_once_then_restart_resubscribes() {
        let (coordinator, backend, db) =
            setup(&[Collection::Products, Collection::Categories]).await;
        let mut events = coordinator.subscribe_events();

        coordinator.start_sync();
        wait_state(&coordinator, Collection::Products, CollectionState::Streaming).await;
        wait_state(&coordinator, Collection::Categories, CollectionState::Streaming).await;

        backend.fail_listeners(
            Collection::Products,
            RemoteError::PermissionDenied("rules".into()),
        );

        let event = timeout(WAIT, events.recv()).await.unwrap().unwrap();
        assert_eq!(
            event,
            SyncEvent::SyncFailed(coordinator.config().notices.stream_failed.clone())
        );
        assert_eq!(events.try_recv(), None);
        assert_eq!(coordinator.state(Collection::Products), Some(CollectionState::Failed));
        assert_eq!(backend.active_listeners(Collection::Products), 0);

        // The other collection keeps streaming.
        assert_eq!(
            coordinator.state(Collection::Categories),
            Some(CollectionState::Streaming)
        );
        assert_eq!(backend.active_listeners(Collection::Categories), 1);

        let entry = db.sync_state().get(Collection::Products).await.unwrap().unwrap();
        assert!(entry.last_error.unwrap().contains("permission denied"));

        coordinator.start_sync();
        wait_state(&coordinator, Collection::Products, CollectionState::Streaming).await;
        assert_eq!(backend.active_listeners(Collection::Products), 1);
        assert_eq!(backend.active_listeners(Collection::Categories), 1);
    }

    #[tokio::test]
    async fn test_listen_failure_and_closed_channel() {
        let (coordinator, backend, _db) =
            setup(&[Collection::Products, Collection::Categories]).await;
        let mut events = coordinator.subscribe_events();
        backend.set_listen_failure(
            Collection::Products,
            Some(RemoteError::Unavailable("offline".into())),
        );

        coordinator.start_sync();
        wait_state(&coordinator, Collection::Products, CollectionState::Failed).await;
        wait_state(&coordinator, Collection::Categories, CollectionState::Streaming).await;
        assert!(timeout(WAIT, events.recv()).await.unwrap().is_some());

        backend.drop_listeners(Collection::Categories);
        wait_state(&coordinator, Collection::Categories, CollectionState::Failed).await;
        assert!(timeout(WAIT, events.recv()).await.unwrap().is_some());
        assert_eq!(events.try_recv(), None);
    }

    #[tokio::test]
    async fn test_snapshots_apply_in_order() {
        let (coordinator, backend, db) = setup(&[Collection::Products]).await;
        coordinator.start_sync();
        wait_state(&coordinator, Collection::Products, CollectionState::Streaming).await;

        backend.set(Collection::Products, "p-1", json!({ "title": "v1" }));
        backend.set(Collection::Products, "p-1", json!({ "title": "v2" }));

        wait_products(&db, |rows| rows.len() == 1 && rows[0].title == "v2").await;
        coordinator.stop_sync().await;

        let product = db.products().get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(product.title, "v2");
    }

    #[tokio::test]
    async fn test_manual_sync_emits_exactly_one_failure() {
        let (coordinator, backend, db) =
            setup(&[Collection::Products, Collection::Categories]).await;
        backend.set(Collection::Categories, "c-1", json!({ "name": "Home" }));
        backend.set_fetch_failure(
            Collection::Products,
            Some(RemoteError::Unavailable("offline".into())),
        );
        backend.set_fetch_failure(
            Collection::Categories,
            Some(RemoteError::Unavailable("offline".into())),
        );
        let mut events = coordinator.subscribe_events();

        coordinator.manual_sync().await;

        assert_eq!(
            events.try_recv(),
            Some(SyncEvent::SyncFailed(
                coordinator.config().notices.refresh_failed.clone()
            ))
        );
        assert_eq!(events.try_recv(), None);
        assert_eq!(db.categories().count().await.unwrap(), 0);

        backend.set_fetch_failure(Collection::Products, None);
        backend.set_fetch_failure(Collection::Categories, None);
        coordinator.manual_sync().await;
        assert_eq!(events.try_recv(), None);
        assert_eq!(db.categories().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_direct_writes_and_status() {
        let (coordinator, backend, _db) = setup(&[Collection::Products]).await;
        backend.set(Collection::Products, "p-1", json!({ "title": "Mug" }));
        coordinator.manual_sync().await;

        let reader = coordinator.reader();
        let mut product = reader.product("p-1").await.unwrap().unwrap();
        product.title = "Blue Mug".into();
        coordinator.cache_product(&product).await.unwrap();
        assert_eq!(reader.product("p-1").await.unwrap().unwrap().title, "Blue Mug");

        let status = coordinator.status().await.unwrap();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].state, CollectionState::Idle);
        assert_eq!(status[0].bookkeeping.as_ref().unwrap().document_count, 1);

        assert!(coordinator.forget_product("p-1").await.unwrap());
        assert!(!coordinator.forget_product("p-1").await.unwrap());

        coordinator.cache_product(&product).await.unwrap();
        coordinator.purge_cache().await.unwrap();
        assert!(reader.products(&ProductFilter::All).await.unwrap().is_empty());
        assert!(coordinator.status().await.unwrap()[0].bookkeeping.is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_collection_has_no_state() {
        let (coordinator, backend, _db) = setup(&[Collection::Products]).await;
        assert_eq!(coordinator.state(Collection::Users), None);
        assert!(coordinator.watch_state(Collection::Users).is_none());

        coordinator.start_sync();
        wait_state(&coordinator, Collection::Products, CollectionState::Streaming).await;
        assert_eq!(backend.active_listeners(Collection::Users), 0);
    }

    #[tokio::test]
    async fn test_cache_write_failure_keeps_streaming() {
        let (coordinator, backend, db) = setup(&[Collection::Products]).await;
        coordinator.start_sync();
        wait_state(&coordinator, Collection::Products, CollectionState::Streaming).await;
        let mut events = coordinator.subscribe_events();

        sqlx::query(
            "CREATE TRIGGER reject_bad BEFORE INSERT ON products \
             WHEN NEW.id = 'bad' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        backend.set(Collection::Products, "bad", json!({ "title": "Broken" }));

        let event = timeout(WAIT, events.recv()).await.unwrap().unwrap();
        assert_eq!(
            event,
            SyncEvent::SyncFailed(coordinator.config().notices.stream_failed.clone())
        );
        assert_eq!(
            coordinator.state(Collection::Products),
            Some(CollectionState::Streaming)
        );
        assert_eq!(backend.active_listeners(Collection::Products), 1);
        let entry = db.sync_state().get(Collection::Products).await.unwrap().unwrap();
        assert!(entry.last_error.is_some());
        assert_eq!(db.products().count().await.unwrap(), 0);

        // The next clean snapshot goes through on the same listener.
        backend.delete(Collection::Products, "bad");
        backend.set(Collection::Products, "p-1", json!({ "title": "Mug" }));
        let rows = wait_products(&db, |rows| rows.len() == 1).await;
        assert_eq!(rows[0].id, "p-1");
        assert_eq!(events.try_recv(), None);

        let entry = db.sync_state().get(Collection::Products).await.unwrap().unwrap();
        assert!(!entry.is_failing());
    }

    #[tokio::test]
    async fn test_start_during_stop_keeps_new_workers() {
        let (coordinator, backend, _db) = setup(&[Collection::Products]).await;
        coordinator.start_sync();
        wait_state(&coordinator, Collection::Products, CollectionState::Streaming).await;

        let stop = coordinator.stop_sync();
        tokio::pin!(stop);
        // The aborted worker has not been reaped yet, so stop is still waiting.
        assert!(futures_util::poll!(stop.as_mut()).is_pending());

        coordinator.start_sync();
        stop.await;

        timeout(WAIT, async {
            while backend.active_listeners(Collection::Products) != 1 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(
            coordinator.state(Collection::Products),
            Some(CollectionState::Streaming)
        );
    }
}
