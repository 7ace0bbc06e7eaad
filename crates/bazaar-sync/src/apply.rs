//! # Snapshot Apply
//!
//! Writes one remote snapshot into the cache.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  snapshot: [doc, doc, doc]                                              │
//! │       │                                                                 │
//! │       │  FromDocument::from_document, one document at a time            │
//! │       ▼                                                                 │
//! │  ┌──────────────┐   Err   ┌──────────────────────────────────────┐     │
//! │  │  parse       │ ──────► │ warn!(collection, id, error); skip    │     │
//! │  └──────┬───────┘         └──────────────────────────────────────┘     │
//! │         │ Ok                                                            │
//! │         ▼                                                               │
//! │  upsert_all(survivors)   one transaction, observers re-query once       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  sync_state.record_success(collection, applied)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A record that fails to parse never fails the batch and never reaches
//! the UI. Only a failed upsert is returned; a failed bookkeeping write
//! after the commit is logged.

use tracing::{debug, warn};

use bazaar_core::{Category, Collection, Document, FromDocument, Product, User};
use bazaar_db::Database;

use crate::error::SyncResult;

/// Outcome of applying one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyReport {
    /// Documents written to the cache.
    pub applied: usize,
    /// Documents dropped because they could not be parsed.
    pub skipped: usize,
}

/// Parses `documents` and upserts the ones that parse.
pub async fn apply_documents(
    db: &Database,
    collection: Collection,
    documents: &[Document],
) -> SyncResult<ApplyReport> {
    let report = match collection {
        Collection::Products => {
            let (products, skipped) = parse_all::<Product>(collection, documents);
            let applied = db.products().upsert_all(&products).await?;
            ApplyReport { applied, skipped }
        }
        Collection::Categories => {
            let (categories, skipped) = parse_all::<Category>(collection, documents);
            let applied = db.categories().upsert_all(&categories).await?;
            ApplyReport { applied, skipped }
        }
        Collection::Users => {
            let (users, skipped) = parse_all::<User>(collection, documents);
            let applied = db.users().upsert_all(&users).await?;
            ApplyReport { applied, skipped }
        }
    };

    // The snapshot is already committed; a bookkeeping miss is not a sync failure.
    if let Err(e) = db
        .sync_state()
        .record_success(collection, report.applied)
        .await
    {
        warn!(collection = %collection, error = %e, "Failed to record sync success");
    }

    debug!(
        collection = %collection,
        applied = report.applied,
        skipped = report.skipped,
        "Snapshot applied"
    );
    Ok(report)
}

fn parse_all<T: FromDocument>(collection: Collection, documents: &[Document]) -> (Vec<T>, usize) {
    let mut parsed = Vec::with_capacity(documents.len());
    let mut skipped = 0;

    for doc in documents {
        match T::from_document(doc) {
            Ok(item) => parsed.push(item),
            Err(e) => {
                warn!(collection = %collection, id = %doc.id, error = %e, "Dropping unparseable document");
                skipped += 1;
            }
        }
    }

    (parsed, skipped)
}
