//! # Remote Collaborator
//!
//! The seam between the coordinator and the managed document database.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     RemoteBackend                                       │
//! │                                                                         │
//! │  listen(collection, callback) ──► ListenerRegistration                  │
//! │     callback(Ok(full snapshot))     once on register, then per change   │
//! │     callback(Err(RemoteError))      listener is dead after this         │
//! │                                                                         │
//! │  registration.remove() / drop  ──► backend stops calling the callback   │
//! │                                                                         │
//! │  fetch_all(collection).await   ──► one-shot full read (manual sync)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every snapshot is the complete collection. The coordinator never asks
//! the backend to filter; filtering happens against the cache.

pub mod memory;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use bazaar_core::{Collection, Document};

pub use memory::MemoryBackend;

// =============================================================================
// Errors
// =============================================================================

/// Failure reported by the remote backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Network down or backend unreachable.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Security rules rejected the read.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Anything else the backend reports.
    #[error("backend error: {0}")]
    Backend(String),
}

/// What a listener callback receives.
pub type SnapshotResult = Result<Vec<Document>, RemoteError>;

/// Callback handed to [`RemoteBackend::listen`].
///
/// Backends may call it from any thread and must not call it again after
/// the registration is removed.
pub type SnapshotListener = Box<dyn Fn(SnapshotResult) + Send + Sync + 'static>;

// =============================================================================
// Listener Registration
// =============================================================================

/// Handle for one live remote listener.
///
/// Removing it, or dropping it, detaches the listener exactly once.
pub struct ListenerRegistration {
    remove: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl ListenerRegistration {
    /// Wraps the backend's detach action.
    pub fn new(remove: impl FnOnce() + Send + 'static) -> Self {
        ListenerRegistration {
            remove: Some(Box::new(remove)),
        }
    }

    /// Detaches the listener now.
    pub fn remove(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

// =============================================================================
// Backend Trait
// =============================================================================

/// A managed document database the cache mirrors.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Attaches a listener that receives full snapshots of `collection`.
    fn listen(
        &self,
        collection: Collection,
        listener: SnapshotListener,
    ) -> Result<ListenerRegistration, RemoteError>;

    /// Reads every document in `collection` once.
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Document>, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_registration_detaches_once() {
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let registration = ListenerRegistration::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        registration.remove();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let counter = Arc::clone(&calls);
        drop(ListenerRegistration::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
