//! # bazaar-core: Domain Layer for the Bazaar Client
//!
//! This crate holds the domain models shared by the local cache and the
//! sync coordinator. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Data Flow                                 │
//! │                                                                         │
//! │  Remote backend (document collections)                                 │
//! │       │  Document { id, data: JSON }                                    │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐    │   │
//! │  │   │   types   │  │   money   │  │        document         │    │   │
//! │  │   │  Product  │  │   Money   │  │  FromDocument (parse +  │    │   │
//! │  │   │  Category │  │           │  │  per-field defaults)    │    │   │
//! │  │   │  User     │  │           │  │                         │    │   │
//! │  │   └───────────┘  └───────────┘  └─────────────────────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bazaar-db (cached rows) ──► bazaar-sync (coordinator)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain models (Product, Category, User, ...)
//! - [`money`] - Integer money type
//! - [`document`] - Remote document parsing
//! - [`error`] - Parse and money errors
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::{Document, FromDocument, Product};
//! use serde_json::json;
//!
//! let doc = Document::new("p-1", json!({ "title": "Mug", "price": 12.5 }));
//! let product = Product::from_document(&doc).unwrap();
//! assert_eq!(product.price.cents(), 1250);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod money;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use document::{Document, FromDocument};
pub use error::{MoneyError, ParseError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency assumed when a remote product omits one.
pub const DEFAULT_CURRENCY: &str = "USD";
