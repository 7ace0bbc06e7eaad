//! # In-Memory Backend
//!
//! A [`RemoteBackend`] held entirely in process. Used by tests and by local
//! development when no managed backend is reachable.
//!
//! Behaves like a live document database: a listener receives the current
//! snapshot as soon as it registers and a fresh full snapshot after every
//! write to its collection. Failures can be injected per collection.
//!
//! Listeners run while the backend lock is held, which keeps snapshots for
//! one collection strictly ordered. A listener must not call back into the
//! backend.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;

use bazaar_core::{Collection, Document};

use super::{ListenerRegistration, RemoteBackend, RemoteError, SnapshotListener};

struct Registered {
    collection: Collection,
    callback: SnapshotListener,
}

#[derive(Default)]
struct State {
    documents: HashMap<Collection, BTreeMap<String, Value>>,
    listeners: BTreeMap<u64, Registered>,
    next_listener: u64,
    listen_failures: HashMap<Collection, RemoteError>,
    fetch_failures: HashMap<Collection, RemoteError>,
}

impl State {
    fn snapshot(&self, collection: Collection) -> Vec<Document> {
        self.documents
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn broadcast(&self, collection: Collection) {
        let snapshot = self.snapshot(collection);
        for registered in self.listeners.values() {
            if registered.collection == collection {
                (registered.callback)(Ok(snapshot.clone()));
            }
        }
    }

    fn detach_all(&mut self, collection: Collection) -> Vec<Registered> {
        let ids: Vec<u64> = self
            .listeners
            .iter()
            .filter(|(_, r)| r.collection == collection)
            .map(|(id, _)| *id)
            .collect();

        ids.into_iter()
            .filter_map(|id| self.listeners.remove(&id))
            .collect()
    }
}

/// In-process document store with live listeners.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<State>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates or replaces one document and notifies listeners.
    pub fn set(&self, collection: Collection, id: impl Into<String>, data: Value) {
        let mut state = self.state();
        state
            .documents
            .entry(collection)
            .or_default()
            .insert(id.into(), data);
        state.broadcast(collection);
    }

    /// Replaces the whole collection in one change.
    pub fn replace_all(&self, collection: Collection, documents: Vec<Document>) {
        let mut state = self.state();
        let docs = documents
            .into_iter()
            .map(|doc| (doc.id, doc.data))
            .collect();
        state.documents.insert(collection, docs);
        state.broadcast(collection);
    }

    /// Removes one document. Listeners are only notified if it existed.
    pub fn delete(&self, collection: Collection, id: &str) -> bool {
        let mut state = self.state();
        let removed = state
            .documents
            .get_mut(&collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            state.broadcast(collection);
        }
        removed
    }

    /// Current documents, ordered by id.
    pub fn documents(&self, collection: Collection) -> Vec<Document> {
        self.state().snapshot(collection)
    }

    // =========================================================================
    // Failure Injection
    // =========================================================================

    /// Delivers `error` to every live listener on `collection`, then detaches
    /// them, the way a backend tears down a rejected listener.
    pub fn fail_listeners(&self, collection: Collection, error: RemoteError) {
        let mut state = self.state();
        let failed = state.detach_all(collection);
        debug!(collection = %collection, count = failed.len(), %error, "Failing listeners");
        for registered in &failed {
            (registered.callback)(Err(error.clone()));
        }
    }

    /// Detaches every listener on `collection` without telling them.
    pub fn drop_listeners(&self, collection: Collection) {
        let dropped = self.state().detach_all(collection);
        debug!(collection = %collection, count = dropped.len(), "Dropping listeners");
    }

    /// Makes `listen` fail for `collection` until cleared with `None`.
    pub fn set_listen_failure(&self, collection: Collection, error: Option<RemoteError>) {
        let mut state = self.state();
        match error {
            Some(e) => state.listen_failures.insert(collection, e),
            None => state.listen_failures.remove(&collection),
        };
    }

    /// Makes `fetch_all` fail for `collection` until cleared with `None`.
    pub fn set_fetch_failure(&self, collection: Collection, error: Option<RemoteError>) {
        let mut state = self.state();
        match error {
            Some(e) => state.fetch_failures.insert(collection, e),
            None => state.fetch_failures.remove(&collection),
        };
    }

    /// Number of attached listeners on `collection`.
    pub fn active_listeners(&self, collection: Collection) -> usize {
        self.state()
            .listeners
            .values()
            .filter(|r| r.collection == collection)
            .count()
    }
}

fn detach(inner: &Weak<Mutex<State>>, id: u64) {
    if let Some(inner) = inner.upgrade() {
        let removed = inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .remove(&id);
        if removed.is_some() {
            debug!(listener = id, "Listener detached");
        }
    }
}

#[async_trait]
impl RemoteBackend for MemoryBackend {
    fn listen(
        &self,
        collection: Collection,
        listener: SnapshotListener,
    ) -> Result<ListenerRegistration, RemoteError> {
        let mut state = self.state();

        if let Some(error) = state.listen_failures.get(&collection) {
            return Err(error.clone());
        }

        let id = state.next_listener;
        state.next_listener += 1;

        listener(Ok(state.snapshot(collection)));
        state.listeners.insert(
            id,
            Registered {
                collection,
                callback: listener,
            },
        );
        debug!(collection = %collection, listener = id, "Listener attached");

        let inner = Arc::downgrade(&self.inner);
        Ok(ListenerRegistration::new(move || detach(&inner, id)))
    }

    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Document>, RemoteError> {
        let state = self.state();
        match state.fetch_failures.get(&collection) {
            Some(error) => Err(error.clone()),
            None => Ok(state.snapshot(collection)),
        }
    }
}
