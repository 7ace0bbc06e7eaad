//! # Change Notification
//!
//! Fan-out of "table X changed" signals from writers to observers.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repository write                                                       │
//! │       │  COMMIT                                                         │
//! │       ▼                                                                 │
//! │  ChangeNotifier::notify(Table::Products)                                │
//! │       │  tokio::sync::broadcast                                         │
//! │       ├──────────────► observe(ActiveOnly)   → re-query, re-emit        │
//! │       ├──────────────► observe(ByCategory)   → re-query, re-emit        │
//! │       └──────────────► observe(categories)   → ignores Products         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The signal carries no payload beyond the table name. Observers always
//! re-read the full result set, so a lagged receiver that missed signals
//! only needs to query once more.

use tokio::sync::broadcast;
use tracing::trace;

/// Default broadcast capacity; overflow only makes observers re-query.
const DEFAULT_CAPACITY: usize = 64;

/// A table whose committed writes are broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    Categories,
    Users,
    SyncState,
}

impl Table {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Categories => "categories",
            Table::Users => "users",
            Table::SyncState => "sync_state",
        }
    }
}

/// Broadcasts committed writes per table.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<Table>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        ChangeNotifier { tx }
    }

    /// Publishes a committed write. Having no observers is not an error.
    pub fn notify(&self, table: Table) {
        let receivers = self.tx.send(table).unwrap_or(0);
        trace!(table = table.as_str(), receivers, "Change notified");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Table> {
        self.tx.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        ChangeNotifier::new(DEFAULT_CAPACITY)
    }
}
