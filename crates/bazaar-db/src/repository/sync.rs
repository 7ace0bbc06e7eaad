//! # Sync State Repository
//!
//! Per-collection sync bookkeeping.
//!
//! ## Lifecycle of a Row
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  (no row)  ─── get() ──► None  → UI shows "never synced"                │
//! │     │                                                                   │
//! │     │ record_success("products", 120)                                   │
//! │     ▼                                                                   │
//! │  last_synced_at = now, document_count = 120, last_error = NULL          │
//! │     │                                                                   │
//! │     │ record_failure("products", "listener: permission denied")         │
//! │     ▼                                                                   │
//! │  last_synced_at, document_count kept; last_error + last_error_at set    │
//! │     │                                                                   │
//! │     │ record_success(...)                                               │
//! │     ▼                                                                   │
//! │  error columns cleared again                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `last_error` is raw text for diagnostics. It is never shown to users.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use bazaar_core::{Collection, SyncStateEntry};

use crate::entity::SyncStateRow;
use crate::error::DbResult;
use crate::notify::{ChangeNotifier, Table};
use crate::ObserveStream;
use crate::repository::observe_table;

/// Repository for sync bookkeeping.
#[derive(Debug, Clone)]
pub struct SyncStateRepository {
    pool: SqlitePool,
    changes: ChangeNotifier,
}

impl SyncStateRepository {
    /// Creates a new SyncStateRepository.
    pub fn new(pool: SqlitePool, changes: ChangeNotifier) -> Self {
        SyncStateRepository { pool, changes }
    }

    /// Records a successfully applied snapshot and clears any error.
    pub async fn record_success(&self, collection: Collection, document_count: usize) -> DbResult<()> {
        let now = Utc::now();
        let count = i64::try_from(document_count).unwrap_or(i64::MAX);

        sqlx::query(
            r#"
            INSERT INTO sync_state (collection, last_synced_at, document_count, last_error, last_error_at)
            VALUES (?1, ?2, ?3, NULL, NULL)
            ON CONFLICT(collection) DO UPDATE SET
                last_synced_at = excluded.last_synced_at,
                document_count = excluded.document_count,
                last_error = NULL,
                last_error_at = NULL
            "#,
        )
        .bind(collection.as_str())
        .bind(now)
        .bind(count)
        .execute(&self.pool)
        .await?;

        self.changes.notify(Table::SyncState);
        debug!(collection = %collection, count, "Recorded sync success");
        Ok(())
    }

    /// Records a failure, keeping the last success fields intact.
    pub async fn record_failure(&self, collection: Collection, error: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO sync_state (collection, last_error, last_error_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(collection) DO UPDATE SET
                last_error = excluded.last_error,
                last_error_at = excluded.last_error_at
            "#,
        )
        .bind(collection.as_str())
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.changes.notify(Table::SyncState);
        debug!(collection = %collection, "Recorded sync failure");
        Ok(())
    }

    /// Bookkeeping for one collection, `None` if it never synced or failed.
    pub async fn get(&self, collection: Collection) -> DbResult<Option<SyncStateEntry>> {
        let row: Option<SyncStateRow> = sqlx::query_as(
            r#"
            SELECT collection, last_synced_at, document_count, last_error, last_error_at
            FROM sync_state
            WHERE collection = ?1
            "#,
        )
        .bind(collection.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(into_entry))
    }

    /// Every recorded collection, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<SyncStateEntry>> {
        let rows: Vec<SyncStateRow> = sqlx::query_as(
            r#"
            SELECT collection, last_synced_at, document_count, last_error, last_error_at
            FROM sync_state
            ORDER BY collection
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(into_entry).collect())
    }

    /// Live view of [`list`](Self::list), for "last updated" copy.
    pub fn observe(&self) -> ObserveStream<SyncStateEntry> {
        let repo = self.clone();
        observe_table(&self.changes, Table::SyncState, move || {
            let repo = repo.clone();
            async move { repo.list().await }
        })
    }

    /// Forgets all bookkeeping.
    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sync_state")
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            self.changes.notify(Table::SyncState);
        }
        Ok(removed)
    }
}

fn into_entry(row: SyncStateRow) -> Option<SyncStateEntry> {
    match row.collection.parse::<Collection>() {
        Ok(collection) => Some(SyncStateEntry {
            collection,
            last_synced_at: row.last_synced_at,
            document_count: row.document_count,
            last_error: row.last_error,
            last_error_at: row.last_error_at,
        }),
        Err(e) => {
            warn!(collection = %row.collection, error = %e, "Skipping unknown sync_state row");
            None
        }
    }
}
