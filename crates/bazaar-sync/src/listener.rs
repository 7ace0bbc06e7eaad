//! # Listener Bridge
//!
//! Turns a callback-style remote listener into an ordered async stream.
//!
//! ```text
//! ┌────────────────────┐  callback(result)  ┌──────────────────┐  next()  ┌────────┐
//! │ RemoteBackend      │ ─────────────────► │ unbounded mpsc   │ ───────► │ worker │
//! │ (any thread)       │   never blocks     │ (order kept)     │          │        │
//! └────────────────────┘                    └──────────────────┘          └────────┘
//!          ▲                                                                   │
//!          └──────────── ListenerRegistration dropped with the stream ◄────────┘
//! ```
//!
//! The channel is unbounded so the backend's callback thread is never
//! blocked and no snapshot is dropped. The worker awaits each apply before
//! pulling the next snapshot, so backlog only grows while a write is slow.

use futures_util::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, trace};

use bazaar_core::Collection;

use crate::remote::{ListenerRegistration, RemoteBackend, RemoteError, SnapshotListener, SnapshotResult};

/// Live snapshots of one collection.
///
/// Yields `Ok(snapshot)` per delivery and `Err` if the backend reports a
/// listener failure. Ends when the backend stops delivering. Dropping the
/// stream removes the remote listener.
pub struct SnapshotStream {
    collection: Collection,
    rx: UnboundedReceiverStream<SnapshotResult>,
    registration: Option<ListenerRegistration>,
}

impl SnapshotStream {
    /// Attaches a listener for `collection`.
    pub fn open(backend: &dyn RemoteBackend, collection: Collection) -> Result<Self, RemoteError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let listener: SnapshotListener = Box::new(move |result| {
            if tx.send(result).is_err() {
                trace!(collection = %collection, "Snapshot arrived after stream closed");
            }
        });

        let registration = backend.listen(collection, listener)?;
        debug!(collection = %collection, "Snapshot stream opened");

        Ok(SnapshotStream {
            collection,
            rx: UnboundedReceiverStream::new(rx),
            registration: Some(registration),
        })
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Removes the remote listener. Already-queued snapshots stay readable.
    pub fn close(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.remove();
            debug!(collection = %self.collection, "Snapshot stream closed");
        }
    }
}

impl Stream for SnapshotStream {
    type Item = SnapshotResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}

impl Drop for SnapshotStream {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SnapshotStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStream")
            .field("collection", &self.collection)
            .field("attached", &self.registration.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryBackend;
    use futures_util::StreamExt;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn next(stream: &mut SnapshotStream) -> Option<SnapshotResult> {
        timeout(Duration::from_secs(5), stream.next()).await.unwrap()
    }

    #[tokio::test]
    async fn test_snapshots_arrive_in_order() {
        let backend = MemoryBackend::new();
        let mut stream = SnapshotStream::open(&backend, Collection::Products).unwrap();

        backend.set(Collection::Products, "p-1", json!({ "title": "v1" }));
        backend.set(Collection::Products, "p-1", json!({ "title": "v2" }));

        assert!(next(&mut stream).await.unwrap().unwrap().is_empty());
        let first = next(&mut stream).await.unwrap().unwrap();
        let second = next(&mut stream).await.unwrap().unwrap();
        assert_eq!(first[0].data["title"], "v1");
        assert_eq!(second[0].data["title"], "v2");
    }

    #[tokio::test]
    async fn test_drop_and_close_detach() {
        let backend = MemoryBackend::new();

        let stream = SnapshotStream::open(&backend, Collection::Categories).unwrap();
        assert_eq!(backend.active_listeners(Collection::Categories), 1);
        drop(stream);
        assert_eq!(backend.active_listeners(Collection::Categories), 0);

        let mut stream = SnapshotStream::open(&backend, Collection::Categories).unwrap();
        stream.close();
        assert_eq!(backend.active_listeners(Collection::Categories), 0);

        // The initial snapshot queued before close is still readable.
        assert!(next(&mut stream).await.unwrap().is_ok());
        assert!(next(&mut stream).await.is_none());
    }

    #[tokio::test]
    async fn test_error_then_end() {
        let backend = MemoryBackend::new();
        let mut stream = SnapshotStream::open(&backend, Collection::Users).unwrap();
        backend.fail_listeners(Collection::Users, RemoteError::Unavailable("offline".into()));

        assert!(next(&mut stream).await.unwrap().is_ok());
        assert_eq!(
            next(&mut stream).await.unwrap(),
            Err(RemoteError::Unavailable("offline".into()))
        );
        assert!(next(&mut stream).await.is_none());
    }

    #[tokio::test]
    async fn test_listen_failure_is_returned() {
        let backend = MemoryBackend::new();
        backend.set_listen_failure(
            Collection::Products,
            Some(RemoteError::PermissionDenied("rules".into())),
        );

        let err = SnapshotStream::open(&backend, Collection::Products).unwrap_err();
        assert!(matches!(err, RemoteError::PermissionDenied(_)));
    }
}
