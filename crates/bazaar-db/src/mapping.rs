//! # Entity Mapping
//!
//! Conversions between domain models and cached rows.
//!
//! Encoding never fails: the domain types are plain data and always
//! serialize. Decoding never fails either. A blob that is missing, `NULL`
//! or not valid JSON for its type degrades to that field's empty value and
//! is logged, so one damaged column cannot hide a product from the catalog.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use bazaar_core::{Category, Money, Product, ProductStatus, User, UserRole};

use crate::entity::{CategoryRow, ProductRow, UserRow};

// =============================================================================
// Blob Helpers
// =============================================================================

/// Serializes a nested value for a TEXT column.
pub(crate) fn encode_blob<T: Serialize>(value: &T, empty: &str) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Blob encode failed, storing empty value");
            empty.to_string()
        }
    }
}

/// Deserializes a TEXT column, falling back to `T::default()`.
pub(crate) fn decode_blob<T>(raw: Option<&str>, table: &str, id: &str, column: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => {
            warn!(table, id, column, "Blob missing, using empty value");
            return T::default();
        }
    };

    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(table, id, column, error = %e, "Blob malformed, using empty value");
            T::default()
        }
    }
}

// =============================================================================
// Products
// =============================================================================

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        ProductRow {
            id: p.id.clone(),
            title: p.title.clone(),
            description: p.description.clone(),
            price_cents: p.price.cents(),
            compare_at_price_cents: p.compare_at_price.map(|m| m.cents()),
            currency: p.currency.clone(),
            category_id: p.category_id.clone(),
            category_name: p.category_name.clone(),
            seller_id: p.seller_id.clone(),
            status: p.status.as_str().to_string(),
            stock: p.stock,
            rating: p.rating,
            images: Some(encode_blob(&p.images, "[]")),
            variants: Some(encode_blob(&p.variants, "[]")),
            shipping: Some(encode_blob(&p.shipping, "{}")),
            tags: Some(encode_blob(&p.tags, "[]")),
            search_keywords: Some(encode_blob(&p.search_keywords, "[]")),
            created_at: p.created_at.clone(),
            updated_at: p.updated_at.clone(),
            cached_at: Utc::now(),
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let images = decode_blob(row.images.as_deref(), "products", &row.id, "images");
        let variants = decode_blob(row.variants.as_deref(), "products", &row.id, "variants");
        let shipping = decode_blob(row.shipping.as_deref(), "products", &row.id, "shipping");
        let tags = decode_blob(row.tags.as_deref(), "products", &row.id, "tags");
        let search_keywords = decode_blob(
            row.search_keywords.as_deref(),
            "products",
            &row.id,
            "search_keywords",
        );

        Product {
            title: row.title,
            description: row.description,
            price: Money::from_cents(row.price_cents),
            compare_at_price: row.compare_at_price_cents.map(Money::from_cents),
            currency: row.currency,
            category_id: row.category_id,
            category_name: row.category_name,
            seller_id: row.seller_id,
            status: ProductStatus::from_str_lossy(&row.status),
            stock: row.stock,
            rating: row.rating,
            images,
            variants,
            shipping,
            tags,
            search_keywords,
            created_at: row.created_at,
            updated_at: row.updated_at,
            id: row.id,
        }
    }
}

// =============================================================================
// Categories
// =============================================================================

impl From<&Category> for CategoryRow {
    fn from(c: &Category) -> Self {
        CategoryRow {
            id: c.id.clone(),
            name: c.name.clone(),
            description: c.description.clone(),
            image_url: c.image_url.clone(),
            parent_id: c.parent_id.clone(),
            subcategories: Some(encode_blob(&c.subcategories, "[]")),
            is_active: c.is_active,
            sort_order: c.sort_order,
            created_at: c.created_at.clone(),
            updated_at: c.updated_at.clone(),
            cached_at: Utc::now(),
        }
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        let subcategories = decode_blob(
            row.subcategories.as_deref(),
            "categories",
            &row.id,
            "subcategories",
        );

        Category {
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            parent_id: row.parent_id,
            subcategories,
            is_active: row.is_active,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
            id: row.id,
        }
    }
}

// =============================================================================
// Users
// =============================================================================

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        UserRow {
            id: u.id.clone(),
            email: u.email.clone(),
            display_name: u.display_name.clone(),
            phone: u.phone.clone(),
            role: u.role.as_str().to_string(),
            photo_url: u.photo_url.clone(),
            addresses: Some(encode_blob(&u.addresses, "[]")),
            is_active: u.is_active,
            created_at: u.created_at.clone(),
            updated_at: u.updated_at.clone(),
            cached_at: Utc::now(),
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let addresses = decode_blob(row.addresses.as_deref(), "users", &row.id, "addresses");

        User {
            email: row.email,
            display_name: row.display_name,
            phone: row.phone,
            role: UserRole::from_str_lossy(&row.role),
            photo_url: row.photo_url,
            addresses,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            id: row.id,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{ProductImage, ProductVariant, ShippingInfo};

    fn sample_product() -> Product {
        Product {
            id: "p-1".into(),
            title: "Mug".into(),
            description: "Stoneware".into(),
            price: Money::from_cents(1250),
            compare_at_price: Some(Money::from_cents(1500)),
            currency: "USD".into(),
            category_id: "c-1".into(),
            category_name: "Kitchen".into(),
            seller_id: "s-1".into(),
            status: ProductStatus::Active,
            stock: 4,
            rating: 4.5,
            images: vec![ProductImage {
                url: "a.png".into(),
                alt: "front".into(),
            }],
            variants: vec![ProductVariant {
                id: "v1".into(),
                name: "Large".into(),
                price_cents: Some(1400),
                stock: 2,
                attributes: Default::default(),
            }],
            shipping: ShippingInfo {
                weight_grams: 350,
                free_shipping: true,
                ships_from: "Lahore".into(),
                estimated_days: 3,
            },
            tags: vec!["gift".into()],
            search_keywords: vec!["mug".into(), "cup".into()],
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-02T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_product_row_keeps_nested_data() {
        let product = sample_product();
        let row = ProductRow::from(&product);
        assert_eq!(row.status, "active");
        assert_eq!(row.price_cents, 1250);

        assert_eq!(Product::from(row), product);
    }

    #[test]
    fn test_corrupt_blobs_decode_to_empty() {
        let mut row = ProductRow::from(&sample_product());
        row.images = Some("{not json".into());
        row.variants = None;
        row.shipping = Some("[]".into());
        row.tags = Some(String::new());

        let product = Product::from(row);
        assert!(product.images.is_empty());
        assert!(product.variants.is_empty());
        assert_eq!(product.shipping, ShippingInfo::default());
        assert!(product.tags.is_empty());
        assert_eq!(product.search_keywords, vec!["mug", "cup"]);
        assert_eq!(product.title, "Mug");
    }

    #[test]
    fn test_unknown_enum_text_degrades() {
        let mut row = ProductRow::from(&sample_product());
        row.status = "archived".into();
        assert_eq!(Product::from(row).status, ProductStatus::Pending);
    }
}
