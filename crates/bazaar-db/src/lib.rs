//! # bazaar-db: Local Cache for the Bazaar Client
//!
//! This crate mirrors remote collections into SQLite and serves reactive
//! reads from that mirror.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Data Flow                                 │
//! │                                                                         │
//! │  bazaar-sync worker (apply snapshot)        UI (CacheReader)            │
//! │       │ upsert_all                               ▲ observe(filter)      │
//! │       ▼                                          │                      │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CategoryRepo  │    │ 001_cache_   │  │   │
//! │  │   │ ChangeNotifier│───►│ UserRepo      │    │  schema.sql  │  │   │
//! │  │   │               │    │ SyncStateRepo │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   entity.rs (rows) ◄── mapping.rs ──► bazaar-core models       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <platform data dir>/bazaar-cache.db                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`entity`] - Cached row types
//! - [`filter`] - Read predicates
//! - [`notify`] - Committed-write notifications
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig, ProductFilter};
//!
//! let db = Database::new(DbConfig::new("path/to/bazaar-cache.db")).await?;
//!
//! db.products().upsert_all(&snapshot).await?;
//! let mut visible = db.products().observe(ProductFilter::ActiveOnly);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod entity;
pub mod error;
pub mod filter;
mod mapping;
pub mod migrations;
pub mod notify;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use filter::{CategoryFilter, ProductFilter, UserFilter};
pub use notify::{ChangeNotifier, Table};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::sync::SyncStateRepository;
pub use repository::user::UserRepository;

/// Stream type returned by every `observe` call.
pub type ObserveStream<T> = futures_util::stream::BoxStream<'static, DbResult<Vec<T>>>;
