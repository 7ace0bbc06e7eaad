//! # bazaar-sync: Sync Coordinator for the Bazaar Client
//!
//! This crate keeps the local cache in step with the remote document
//! database and reports failures without ever blocking a reader.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sync Coordinator Architecture                      │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                     SyncCoordinator                              │  │
//! │  │                                                                  │  │
//! │  │  start_sync()  → one tokio task per collection                   │  │
//! │  │  stop_sync()   → abort + await, listeners detached on return     │  │
//! │  │  manual_sync() → fetch_all + apply, one notice on failure        │  │
//! │  └───────────────┬──────────────────────────────────┬───────────────┘  │
//! │                  │                                  │                   │
//! │                  ▼                                  ▼                   │
//! │  ┌────────────────────────────┐      ┌──────────────────────────────┐  │
//! │  │ SnapshotStream (listener)  │      │ SyncEventBus                 │  │
//! │  │                            │      │                              │  │
//! │  │ RemoteBackend callback →   │      │ SyncFailed(notice), replay 1 │  │
//! │  │ unbounded mpsc → worker    │      │ → UI snackbar / banner       │  │
//! │  └─────────────┬──────────────┘      └──────────────────────────────┘  │
//! │                │ snapshot                                               │
//! │                ▼                                                        │
//! │  ┌────────────────────────────┐      ┌──────────────────────────────┐  │
//! │  │ apply_documents            │      │ CacheReader                  │  │
//! │  │ parse → drop bad → upsert  │ ───► │ observe / query / search     │  │
//! │  │ (bazaar-db)                │      │ (read-only, UI side)         │  │
//! │  └────────────────────────────┘      └──────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`coordinator`] - `SyncCoordinator` and per-collection workers
//! - [`listener`] - Callback to stream bridge
//! - [`apply`] - Snapshot parsing and cache writes
//! - [`events`] - Failure notices with replay
//! - [`reader`] - Read-only cache view
//! - [`remote`] - Backend trait and the in-memory backend
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Sync error types
//!
//! ## Usage
//! ```rust,ignore
//! use bazaar_sync::{MemoryBackend, SyncConfig, SyncCoordinator};
//!
//! let config = SyncConfig::load_or_default(None);
//! let db = bazaar_db::Database::new(config.db_config()?).await?;
//! let coordinator = SyncCoordinator::new(db, Arc::new(MemoryBackend::new()), config);
//!
//! let mut notices = coordinator.subscribe_events();
//! coordinator.start_sync();
//! let products = coordinator.reader().observe_products(ProductFilter::ActiveOnly);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod apply;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod listener;
pub mod reader;
pub mod remote;

// =============================================================================
// Re-exports
// =============================================================================

pub use apply::{apply_documents, ApplyReport};
pub use config::{Notices, SyncConfig};
pub use coordinator::{CollectionState, CollectionStatus, SyncCoordinator};
pub use error::{SyncError, SyncResult};
pub use events::{SyncEvent, SyncEventBus, SyncEventReceiver};
pub use listener::SnapshotStream;
pub use reader::CacheReader;
pub use remote::{
    ListenerRegistration, MemoryBackend, RemoteBackend, RemoteError, SnapshotListener,
    SnapshotResult,
};
