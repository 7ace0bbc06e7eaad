//! # Remote Documents
//!
//! Parsing of raw remote records into domain models.
//!
//! ## Parse Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Document { id, data: JSON }                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  FromDocument::from_document                                           │
//! │       │                                                                 │
//! │       ├── data not an object / empty id ──► Err(ParseError)            │
//! │       ├── price not a number ───────────► Err(ParseError)              │
//! │       │                                                                 │
//! │       └── every other field: explicit default on bad / missing value   │
//! │             text    → ""          int/float → 0                        │
//! │             flags   → per field   lists     → bad elements dropped     │
//! │             objects → Default     timestamp → RFC 3339 or ""           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A price is the only field where guessing would show the customer a wrong
//! number, so it is the only field that rejects the record.
//!
//! Field names are looked up as written (`category_id`) and then in the
//! camelCase form the backend console produces (`categoryId`).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{ParseError, ParseResult};
use crate::money::Money;
use crate::types::{
    Address, Category, Product, ProductImage, ProductStatus, ProductVariant, ShippingInfo,
    Subcategory, User, UserRole,
};
use crate::DEFAULT_CURRENCY;

// =============================================================================
// Document
// =============================================================================

/// One remote record: its id plus a schemaless JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Document {
            id: id.into(),
            data,
        }
    }
}

/// Fallible conversion from a remote document.
pub trait FromDocument: Sized {
    fn from_document(doc: &Document) -> ParseResult<Self>;
}

// =============================================================================
// Field Reader
// =============================================================================

/// Typed, lenient accessors over a JSON object.
struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Validates the document envelope.
    fn open(doc: &'a Document) -> ParseResult<Self> {
        if doc.id.trim().is_empty() {
            return Err(ParseError::MissingId);
        }
        match doc.data.as_object() {
            Some(map) => Ok(Fields { map }),
            None => Err(ParseError::NotAnObject { id: doc.id.clone() }),
        }
    }

    fn of(value: &'a Value) -> Option<Self> {
        value.as_object().map(|map| Fields { map })
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        match self.map.get(key) {
            Some(Value::Null) | None => match self.map.get(&snake_to_camel(key)) {
                Some(Value::Null) | None => None,
                found => found,
            },
            found => found,
        }
    }

    fn text(&self, key: &str) -> String {
        self.get(key).and_then(value_to_text).unwrap_or_default()
    }

    /// Text where blank means absent.
    fn opt_text(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(value_to_text)
            .filter(|s| !s.trim().is_empty())
    }

    fn int(&self, key: &str) -> i64 {
        self.get(key).and_then(value_to_i64).unwrap_or(0)
    }

    fn float(&self, key: &str) -> f64 {
        self.get(key).and_then(value_to_f64).unwrap_or(0.0)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(value_to_bool).unwrap_or(default)
    }

    /// Missing or null is `None`; anything that is not a decimal amount
    /// rejects the whole record.
    fn money(&self, key: &str) -> ParseResult<Option<Money>> {
        let value = match self.get(key) {
            Some(value) => value,
            None => return Ok(None),
        };
        let parsed = match value {
            Value::Number(n) => match n.as_f64() {
                Some(amount) => Money::from_major_units(amount),
                None => return Err(ParseError::invalid(key, "number out of range")),
            },
            Value::String(s) => Money::parse_decimal(s),
            other => {
                return Err(ParseError::invalid(
                    key,
                    format!("expected a number, got {}", json_kind(other)),
                ))
            }
        };
        parsed
            .map(Some)
            .map_err(|e| ParseError::invalid(key, e.to_string()))
    }

    fn strings(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(value_to_text).collect(),
            _ => Vec::new(),
        }
    }

    /// Decodes each element with `decode`, dropping the ones it rejects.
    fn list<T>(&self, key: &str, decode: impl Fn(&Value) -> Option<T>) -> Vec<T> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(decode).collect(),
            _ => Vec::new(),
        }
    }

    fn nested(&self, key: &str) -> Option<Fields<'a>> {
        self.get(key).and_then(Fields::of)
    }

    /// String attribute map; non-text values are dropped.
    fn text_map(&self, key: &str) -> BTreeMap<String, String> {
        match self.get(key) {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(k, v)| value_to_text(v).map(|v| (k.clone(), v)))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    fn timestamp(&self, key: &str) -> String {
        self.get(key).and_then(value_to_timestamp).unwrap_or_default()
    }
}

// =============================================================================
// Value Conversions
// =============================================================================

fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for ch in key.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|f| f.is_finite())
}

fn value_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    }
}

/// Strings are kept verbatim; epoch millis and `{seconds, nanoseconds}`
/// objects are rendered as RFC 3339.
fn value_to_timestamp(value: &Value) -> Option<String> {
    let rendered = |dt: DateTime<Utc>| dt.to_rfc3339_opts(SecondsFormat::Millis, true);
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(rendered),
        Value::Object(_) => {
            let fields = Fields::of(value)?;
            let seconds = fields
                .get("seconds")
                .or_else(|| fields.get("_seconds"))
                .and_then(value_to_i64)?;
            let nanos = fields
                .get("nanoseconds")
                .or_else(|| fields.get("_nanoseconds"))
                .and_then(value_to_i64)
                .unwrap_or(0);
            let nanos = u32::try_from(nanos).ok()?;
            DateTime::from_timestamp(seconds, nanos).map(rendered)
        }
        _ => None,
    }
}

// =============================================================================
// Nested Decoders
// =============================================================================

fn decode_image(value: &Value) -> Option<ProductImage> {
    if let Value::String(url) = value {
        return (!url.trim().is_empty()).then(|| ProductImage {
            url: url.clone(),
            alt: String::new(),
        });
    }
    let f = Fields::of(value)?;
    let url = f.opt_text("url")?;
    Some(ProductImage {
        url,
        alt: f.text("alt"),
    })
}

/// A variant with an unreadable price is dropped rather than shown at the
/// parent price.
fn decode_variant(value: &Value) -> Option<ProductVariant> {
    let f = Fields::of(value)?;
    let price_cents = f.money("price").ok()?.map(|m| m.cents());
    Some(ProductVariant {
        id: f.text("id"),
        name: f.text("name"),
        price_cents,
        stock: f.int("stock"),
        attributes: f.text_map("attributes"),
    })
}

fn decode_shipping(f: &Fields<'_>) -> ShippingInfo {
    ShippingInfo {
        weight_grams: f.int("weight_grams"),
        free_shipping: f.flag("free_shipping", false),
        ships_from: f.text("ships_from"),
        estimated_days: f.int("estimated_days"),
    }
}

fn decode_subcategory(value: &Value) -> Option<Subcategory> {
    let f = Fields::of(value)?;
    Some(Subcategory {
        id: f.opt_text("id")?,
        name: f.text("name"),
        image_url: f.text("image_url"),
    })
}

fn decode_address(value: &Value) -> Option<Address> {
    let f = Fields::of(value)?;
    Some(Address {
        label: f.text("label"),
        line1: f.text("line1"),
        line2: f.text("line2"),
        city: f.text("city"),
        region: f.text("region"),
        postal_code: f.text("postal_code"),
        country: f.text("country"),
    })
}

// =============================================================================
// FromDocument Implementations
// =============================================================================

impl FromDocument for Product {
    fn from_document(doc: &Document) -> ParseResult<Self> {
        let f = Fields::open(doc)?;

        let price = f.money("price")?.unwrap_or_default();
        let compare_at_price = f.money("compare_at_price")?;

        Ok(Product {
            id: doc.id.clone(),
            title: f.text("title"),
            description: f.text("description"),
            price,
            compare_at_price,
            currency: f
                .opt_text("currency")
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            category_id: f.text("category_id"),
            category_name: f.text("category_name"),
            seller_id: f.text("seller_id"),
            status: ProductStatus::from_str_lossy(&f.text("status")),
            stock: f.int("stock"),
            rating: f.float("rating").clamp(0.0, 5.0),
            images: f.list("images", decode_image),
            variants: f.list("variants", decode_variant),
            shipping: f
                .nested("shipping")
                .map(|s| decode_shipping(&s))
                .unwrap_or_default(),
            tags: f.strings("tags"),
            search_keywords: f.strings("search_keywords"),
            created_at: f.timestamp("created_at"),
            updated_at: f.timestamp("updated_at"),
        })
    }
}

impl FromDocument for Category {
    fn from_document(doc: &Document) -> ParseResult<Self> {
        let f = Fields::open(doc)?;

        Ok(Category {
            id: doc.id.clone(),
            name: f.text("name"),
            description: f.text("description"),
            image_url: f.text("image_url"),
            parent_id: f.opt_text("parent_id"),
            subcategories: f.list("subcategories", decode_subcategory),
            is_active: f.flag("is_active", true),
            sort_order: f.int("sort_order"),
            created_at: f.timestamp("created_at"),
            updated_at: f.timestamp("updated_at"),
        })
    }
}

impl FromDocument for User {
    fn from_document(doc: &Document) -> ParseResult<Self> {
        let f = Fields::open(doc)?;

        Ok(User {
            id: doc.id.clone(),
            email: f.text("email"),
            display_name: f.text("display_name"),
            phone: f.text("phone"),
            role: UserRole::from_str_lossy(&f.text("role")),
            photo_url: f.text("photo_url"),
            addresses: f.list("addresses", decode_address),
            is_active: f.flag("is_active", true),
            created_at: f.timestamp("created_at"),
            updated_at: f.timestamp("updated_at"),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
