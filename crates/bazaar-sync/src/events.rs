//! # Sync Events
//!
//! The failure side-channel from the coordinator to the UI.
//!
//! ## Delivery Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  emit(SyncFailed)  ──► replay slot (last event)                         │
//! │                    └─► broadcast to current receivers                   │
//! │                                                                         │
//! │  subscribe()       ──► replay slot first (if any), then live events     │
//! │                                                                         │
//! │  emit and subscribe share one lock, so an event is either in the        │
//! │  replay slot a receiver starts with or in its live queue. Never both.   │
//! │                                                                         │
//! │  A receiver that falls behind skips what it missed (at-most-once).      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use futures_util::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

/// Notification for UI-layer subscribers.
///
/// Carries pre-set display copy, never raw error text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "message", rename_all = "snake_case")]
pub enum SyncEvent {
    SyncFailed(String),
}

impl SyncEvent {
    /// The text to show.
    pub fn message(&self) -> &str {
        match self {
            SyncEvent::SyncFailed(message) => message,
        }
    }
}

#[derive(Debug)]
struct BusState {
    tx: broadcast::Sender<SyncEvent>,
    last: Option<SyncEvent>,
}

/// Broadcast bus with a replay buffer of one.
#[derive(Debug, Clone)]
pub struct SyncEventBus {
    state: Arc<Mutex<BusState>>,
}

impl SyncEventBus {
    /// Creates a bus whose receivers buffer up to `capacity` live events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        SyncEventBus {
            state: Arc::new(Mutex::new(BusState { tx, last: None })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `event` for late subscribers and delivers it to current ones.
    pub fn emit(&self, event: SyncEvent) {
        let mut state = self.lock();
        state.last = Some(event.clone());
        let delivered = state.tx.send(event).unwrap_or(0);
        debug!(receivers = delivered, "Sync event emitted");
    }

    pub fn subscribe(&self) -> SyncEventReceiver {
        let state = self.lock();
        SyncEventReceiver {
            replay: state.last.clone(),
            rx: state.tx.subscribe(),
        }
    }

    /// The event a new subscriber would receive first.
    pub fn last_event(&self) -> Option<SyncEvent> {
        self.lock().last.clone()
    }
}

impl Default for SyncEventBus {
    fn default() -> Self {
        Self::new(8)
    }
}

/// One subscriber's view of the bus.
#[derive(Debug)]
pub struct SyncEventReceiver {
    replay: Option<SyncEvent>,
    rx: broadcast::Receiver<SyncEvent>,
}

impl SyncEventReceiver {
    /// Waits for the next event. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<SyncEvent> {
        if let Some(event) = self.replay.take() {
            return Some(event);
        }

        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    debug!(missed, "Sync event receiver lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns a pending event without waiting.
    pub fn try_recv(&mut self) -> Option<SyncEvent> {
        if let Some(event) = self.replay.take() {
            return Some(event);
        }

        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(missed)) => {
                    debug!(missed, "Sync event receiver lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Adapts the receiver into a `Stream`, skipping lag gaps.
    pub fn into_stream(self) -> BoxStream<'static, SyncEvent> {
        let live = BroadcastStream::new(self.rx).filter_map(|item| async move { item.ok() });
        stream::iter(self.replay).chain(live).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn failed(message: &str) -> SyncEvent {
        SyncEvent::SyncFailed(message.to_string())
    }

    #[test]
    fn test_replay_to_late_subscriber() {
        let bus = SyncEventBus::new(4);
        bus.emit(failed("one"));
        bus.emit(failed("two"));

        let mut rx = bus.subscribe();
        assert_eq!(rx.try_recv(), Some(failed("two")));
        assert_eq!(rx.try_recv(), None);
    }

    #[test]
    fn test_live_event_seen_exactly_once() {
        let bus = SyncEventBus::new(4);
        let mut early = bus.subscribe();
        bus.emit(failed("boom"));
        let mut late = bus.subscribe();

        assert_eq!(early.try_recv(), Some(failed("boom")));
        assert_eq!(early.try_recv(), None);
        assert_eq!(late.try_recv(), Some(failed("boom")));
        assert_eq!(late.try_recv(), None);
    }

    #[tokio::test]
    async fn test_lagged_receiver_skips_missed() {
        let bus = SyncEventBus::new(2);
        let mut rx = bus.subscribe();
        for message in ["a", "b", "c", "d"] {
            bus.emit(failed(message));
        }

        let got = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(got, Some(failed("c")));
        assert_eq!(rx.try_recv(), Some(failed("d")));
    }

    #[tokio::test]
    async fn test_into_stream_replays_then_follows() {
        let bus = SyncEventBus::default();
        bus.emit(failed("first"));
        let mut events = bus.subscribe().into_stream();

        bus.emit(failed("second"));

        let a = timeout(Duration::from_secs(5), events.next()).await.unwrap();
        let b = timeout(Duration::from_secs(5), events.next()).await.unwrap();
        assert_eq!(a, Some(failed("first")));
        assert_eq!(b, Some(failed("second")));
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(failed("Refresh failed")).unwrap();
        assert_eq!(json["type"], "sync_failed");
        assert_eq!(json["message"], "Refresh failed");
    }
}
