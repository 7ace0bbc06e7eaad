//! # Repository Module
//!
//! Cache access for each mirrored table.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories                                         │
//! │                                                                         │
//! │  Sync coordinator                    CacheReader (UI)                   │
//! │       │                                   │                             │
//! │       │  upsert_all(batch)                │  observe(filter)            │
//! │       ▼                                   ▼                             │
//! │  ProductRepository ─────────────────────────────────────────────        │
//! │  ├── upsert_all / upsert        (one transaction, then notify)          │
//! │  ├── observe / query            (full result set, ordered)              │
//! │  ├── search_by_text             (products only)                         │
//! │  ├── get_by_id / count                                                  │
//! │  └── delete_by_id / clear       (idempotent)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database ── COMMIT ──► ChangeNotifier ──► observers re-query    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products and text search
//! - [`CategoryRepository`](category::CategoryRepository) - Category tree
//! - [`UserRepository`](user::UserRepository) - User profiles
//! - [`SyncStateRepository`](sync::SyncStateRepository) - Per-collection bookkeeping

pub mod category;
pub mod product;
pub mod sync;
pub mod user;

use futures_util::stream::{self, StreamExt};
use std::future::Future;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::debug;

use crate::error::DbResult;
use crate::notify::{ChangeNotifier, Table};
use crate::ObserveStream;

/// Builds an infinite stream of full result sets for `table`.
///
/// Subscribes before the first query, so a write that commits between the
/// subscription and the initial read still produces a re-emission.
/// Notifications that pile up while a query runs are coalesced into one
/// re-query.
pub(crate) fn observe_table<T, F, Fut>(
    changes: &ChangeNotifier,
    table: Table,
    query: F,
) -> ObserveStream<T>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = DbResult<Vec<T>>> + Send + 'static,
{
    let rx = changes.subscribe();

    stream::unfold((rx, query, true), move |(mut rx, query, first)| async move {
        if !first {
            loop {
                match rx.recv().await {
                    Ok(changed) if changed == table => break,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(missed)) => {
                        debug!(table = table.as_str(), missed, "Observer lagged, re-querying");
                        break;
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
            while let Ok(_) | Err(TryRecvError::Lagged(_)) = rx.try_recv() {}
        }

        let result = query().await;
        Some((result, (rx, query, false)))
    })
    .boxed()
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("mug"), "mug");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
