//! # Domain Types
//!
//! Fully typed domain models for the Bazaar catalog.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Category     │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (remote)    │   │  id (remote)    │   │  id (remote)    │       │
//! │  │  title          │   │  name           │   │  email          │       │
//! │  │  price: Money   │   │  parent_id      │   │  role           │       │
//! │  │  status         │   │  subcategories  │   │  addresses      │       │
//! │  │  images/variants│   │  sort_order     │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ProductStatus  │   │    UserRole     │   │   Collection    │       │
//! │  │  Active         │   │  Customer       │   │  products       │       │
//! │  │  Inactive       │   │  Seller         │   │  categories     │       │
//! │  │  Pending        │   │  Admin          │   │  users          │       │
//! │  │  Rejected       │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every model is keyed by the remote document id. The client never mints
//! ids for remote records; the cache upserts by that key.
//!
//! ## Timestamps
//! `created_at` / `updated_at` are opaque strings. The backend is free to
//! change their representation, and the cache only ever displays them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::money::Money;

// =============================================================================
// Collection
// =============================================================================

/// A remote collection mirrored into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Products,
    Categories,
    Users,
}

impl Collection {
    /// Every collection, in sync order.
    pub const ALL: [Collection; 3] = [
        Collection::Products,
        Collection::Categories,
        Collection::Users,
    ];

    /// Remote collection name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Categories => "categories",
            Collection::Users => "users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "products" => Ok(Collection::Products),
            "categories" => Ok(Collection::Categories),
            "users" => Ok(Collection::Users),
            other => Err(ParseError::invalid(
                "collection",
                format!("unknown collection '{other}'"),
            )),
        }
    }
}

// =============================================================================
// Product Status
// =============================================================================

/// Moderation status of a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Visible to customers.
    Active,
    /// Hidden by the seller.
    Inactive,
    /// Waiting for admin review.
    Pending,
    /// Refused by an admin.
    Rejected,
}

impl ProductStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Pending => "pending",
            ProductStatus::Rejected => "rejected",
        }
    }

    /// Lenient parse: anything unrecognized is `Pending`, so a listing
    /// with an unexpected status never becomes publicly visible.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => ProductStatus::Active,
            "inactive" => ProductStatus::Inactive,
            "rejected" => ProductStatus::Rejected,
            _ => ProductStatus::Pending,
        }
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Pending
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product image reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductImage {
    pub url: String,
    pub alt: String,
}

/// A purchasable variant (size, colour, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductVariant {
    pub id: String,
    pub name: String,
    /// Overrides the product price when present.
    pub price_cents: Option<i64>,
    pub stock: i64,
    pub attributes: BTreeMap<String, String>,
}

/// Shipping details for a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingInfo {
    pub weight_grams: i64,
    pub free_shipping: bool,
    pub ships_from: String,
    pub estimated_days: i64,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Remote document id.
    pub id: String,

    /// Display title, also the primary sort key.
    pub title: String,

    pub description: String,

    /// Selling price.
    pub price: Money,

    /// Strike-through "was" price.
    pub compare_at_price: Option<Money>,

    /// ISO 4217 code, defaults to [`crate::DEFAULT_CURRENCY`].
    pub currency: String,

    pub category_id: String,

    /// Denormalized category name, searched by `search_by_text`.
    pub category_name: String,

    pub seller_id: String,
    pub status: ProductStatus,
    pub stock: i64,

    /// Average review rating, 0.0 to 5.0.
    pub rating: f64,

    pub images: Vec<ProductImage>,
    pub variants: Vec<ProductVariant>,
    pub shipping: ShippingInfo,
    pub tags: Vec<String>,

    /// Lowercased search terms maintained by the backend.
    pub search_keywords: Vec<String>,

    pub created_at: String,
    pub updated_at: String,
}

impl Product {
    /// Checks if the listing is visible to customers.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// First image, used as the list thumbnail.
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.first()
    }

    /// In stock when the product itself or any variant has stock.
    pub fn in_stock(&self) -> bool {
        self.stock > 0 || self.variants.iter().any(|v| v.stock > 0)
    }
}

// =============================================================================
// Category
// =============================================================================

/// Lightweight child entry embedded in a category document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subcategory {
    pub id: String,
    pub name: String,
    pub image_url: String,
}

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// `None` for top-level categories.
    pub parent_id: Option<String>,
    pub subcategories: Vec<Subcategory>,
    pub is_active: bool,
    pub sort_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Category {
    #[inline]
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

// =============================================================================
// User
// =============================================================================

/// Role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Seller,
    Admin,
}

impl UserRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Seller => "seller",
            UserRole::Admin => "admin",
        }
    }

    /// Lenient parse: anything unrecognized is the least privileged role.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "seller" => UserRole::Seller,
            "admin" => UserRole::Admin,
            _ => UserRole::Customer,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Customer
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A postal address stored on a user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub label: String,
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

/// A user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub phone: String,
    pub role: UserRole,
    pub photo_url: String,
    pub addresses: Vec<Address>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

// =============================================================================
// Sync Bookkeeping
// =============================================================================

/// Per-collection sync bookkeeping, one row per collection.
///
/// `last_error` holds raw error text for diagnostics. It is never shown to
/// end users; the UI renders pre-set copy instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStateEntry {
    pub collection: Collection,
    /// Last time a full snapshot was applied.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Records applied by the last successful sync.
    pub document_count: i64,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
}

impl SyncStateEntry {
    /// A collection that has never synced.
    pub fn never_synced(collection: Collection) -> Self {
        SyncStateEntry {
            collection,
            last_synced_at: None,
            document_count: 0,
            last_error: None,
            last_error_at: None,
        }
    }

    /// True when the most recent attempt failed.
    pub fn is_failing(&self) -> bool {
        match (self.last_error_at, self.last_synced_at) {
            (Some(err), Some(ok)) => err > ok,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
