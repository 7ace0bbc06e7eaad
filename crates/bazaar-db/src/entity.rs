//! # Cached Entities
//!
//! Flat, storage-shaped rows. One row per remote document, keyed by its id.
//!
//! ```text
//! ┌───────────────────────────┐          ┌───────────────────────────────┐
//! │  Product (bazaar-core)    │  mapping │  ProductRow (this module)      │
//! │  ───────────────────────  │ ───────► │  ───────────────────────────   │
//! │  price: Money             │          │  price_cents: i64              │
//! │  status: ProductStatus    │          │  status: TEXT                  │
//! │  images: Vec<ProductImage>│          │  images: TEXT (JSON blob)      │
//! │  shipping: ShippingInfo   │ ◄─────── │  shipping: TEXT (JSON blob)    │
//! │                           │          │  cached_at: local write time   │
//! └───────────────────────────┘          └───────────────────────────────┘
//! ```
//!
//! Blob columns are `Option<String>` so a `NULL` written by hand or by an
//! older client decodes to the empty value instead of failing the read.

use chrono::{DateTime, Utc};

/// Columns selected for every product read, in `ProductRow` order.
pub(crate) const PRODUCT_COLUMNS: &str = "id, title, description, price_cents, \
    compare_at_price_cents, currency, category_id, category_name, seller_id, status, \
    stock, rating, images, variants, shipping, tags, search_keywords, created_at, \
    updated_at, cached_at";

pub(crate) const CATEGORY_COLUMNS: &str = "id, name, description, image_url, parent_id, \
    subcategories, is_active, sort_order, created_at, updated_at, cached_at";

pub(crate) const USER_COLUMNS: &str = "id, email, display_name, phone, role, photo_url, \
    addresses, is_active, created_at, updated_at, cached_at";

/// A cached product.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub currency: String,
    pub category_id: String,
    pub category_name: String,
    pub seller_id: String,
    pub status: String,
    pub stock: i64,
    pub rating: f64,
    /// JSON array of `ProductImage`.
    pub images: Option<String>,
    /// JSON array of `ProductVariant`.
    pub variants: Option<String>,
    /// JSON object `ShippingInfo`.
    pub shipping: Option<String>,
    /// JSON array of strings.
    pub tags: Option<String>,
    /// JSON array of strings, matched by text search.
    pub search_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub cached_at: DateTime<Utc>,
}

/// A cached category.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub parent_id: Option<String>,
    /// JSON array of `Subcategory`.
    pub subcategories: Option<String>,
    pub is_active: bool,
    pub sort_order: i64,
    pub created_at: String,
    pub updated_at: String,
    pub cached_at: DateTime<Utc>,
}

/// A cached user profile.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub phone: String,
    pub role: String,
    pub photo_url: String,
    /// JSON array of `Address`.
    pub addresses: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub cached_at: DateTime<Utc>,
}

/// One row of `sync_state`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SyncStateRow {
    pub collection: String,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub document_count: i64,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
}
