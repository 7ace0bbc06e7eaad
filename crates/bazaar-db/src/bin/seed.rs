//! # Seed Data Generator
//!
//! Fills a local cache file with generated catalog data, so UI work can
//! run without a backend.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p bazaar-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p bazaar-db --bin seed -- --count 5000
//!
//! # Specify database path
//! cargo run -p bazaar-db --bin seed -- --db ./data/bazaar-cache.db
//! ```
//!
//! ## Generated Data
//! - One top-level category per department, plus one child per department
//! - Products spread across the departments, one in seven left `pending`
//! - Deterministic prices, stock and keywords derived from the index

use chrono::{Duration, Utc};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use bazaar_core::{
    Category, Money, Product, ProductImage, ProductStatus, ProductVariant, ShippingInfo,
    Subcategory, DEFAULT_CURRENCY,
};
use bazaar_db::{Database, DbConfig};

/// Departments and the item names generated inside each.
const DEPARTMENTS: &[(&str, &[&str])] = &[
    (
        "Kitchen",
        &["Mug", "Teapot", "Chef Knife", "Cutting Board", "Skillet", "Spice Rack"],
    ),
    (
        "Apparel",
        &["Kurta", "Shawl", "Sneakers", "Denim Jacket", "Cap", "Scarf"],
    ),
    (
        "Electronics",
        &["Earbuds", "Power Bank", "USB-C Cable", "Smart Watch", "Speaker"],
    ),
    (
        "Home",
        &["Cushion", "Rug", "Table Lamp", "Wall Clock", "Vase", "Throw Blanket"],
    ),
    ("Books", &["Cookbook", "Novel", "Atlas", "Notebook", "Planner"]),
];

const SIZES: &[(&str, i64)] = &[("Small", 0), ("Medium", 150), ("Large", 300)];

const BATCH_SIZE: usize = 250;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bazaar=debug,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./bazaar_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bazaar Cache Seed Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./bazaar_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %db_path, count, "Seeding cache");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Cache already has products, skipping seed");
        return Ok(());
    }

    let categories = generate_categories();
    db.categories().upsert_all(&categories).await?;
    info!(count = categories.len(), "Seeded categories");

    let start = std::time::Instant::now();
    let products: Vec<Product> = (0..count).map(generate_product).collect();
    for batch in products.chunks(BATCH_SIZE) {
        db.products().upsert_all(batch).await?;
    }

    let elapsed = start.elapsed();
    info!(
        count = products.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Seeded products"
    );

    let hits = db.products().search_by_text("mug").await?;
    info!(hits = hits.len(), "Search check for 'mug'");

    db.close().await;
    Ok(())
}

fn department_id(name: &str) -> String {
    format!("cat-{}", name.to_ascii_lowercase())
}

fn generate_categories() -> Vec<Category> {
    let now = Utc::now().to_rfc3339();
    let mut out = Vec::new();

    for (idx, (name, _)) in DEPARTMENTS.iter().enumerate() {
        let id = department_id(name);
        let child_id = format!("{id}-featured");

        out.push(Category {
            id: id.clone(),
            name: name.to_string(),
            description: format!("Everything {}", name.to_ascii_lowercase()),
            image_url: format!("https://picsum.photos/seed/{id}/400/400"),
            parent_id: None,
            subcategories: vec![Subcategory {
                id: child_id.clone(),
                name: format!("Featured {name}"),
                image_url: String::new(),
            }],
            is_active: true,
            sort_order: idx as i64,
            created_at: now.clone(),
            updated_at: now.clone(),
        });

        out.push(Category {
            id: child_id,
            name: format!("Featured {name}"),
            description: String::new(),
            image_url: String::new(),
            parent_id: Some(id),
            subcategories: Vec::new(),
            is_active: true,
            sort_order: 0,
            created_at: now.clone(),
            updated_at: now.clone(),
        });
    }

    out
}

/// Builds one product from its index; the same index always yields the
/// same catalog data apart from the id.
fn generate_product(seed: usize) -> Product {
    let (department, items) = DEPARTMENTS[seed % DEPARTMENTS.len()];
    let item = items[(seed / DEPARTMENTS.len()) % items.len()];
    let created = Utc::now() - Duration::days((seed % 90) as i64);

    let base_cents = 299 + ((seed * 37) % 4700) as i64;
    let status = if seed % 7 == 0 {
        ProductStatus::Pending
    } else {
        ProductStatus::Active
    };

    let variants = SIZES
        .iter()
        .enumerate()
        .map(|(idx, (size, addon))| ProductVariant {
            id: format!("v-{seed}-{idx}"),
            name: size.to_string(),
            price_cents: Some(base_cents + addon),
            stock: ((seed + idx * 3) % 12) as i64,
            attributes: [("size".to_string(), size.to_string())].into_iter().collect(),
        })
        .collect();

    let id = Uuid::new_v4().to_string();
    Product {
        title: format!("{item} #{seed}"),
        description: format!("A dependable {} from our {department} range.", item.to_ascii_lowercase()),
        price: Money::from_cents(base_cents),
        compare_at_price: (seed % 5 == 0).then(|| Money::from_cents(base_cents * 5 / 4)),
        currency: DEFAULT_CURRENCY.to_string(),
        category_id: department_id(department),
        category_name: department.to_string(),
        seller_id: format!("seller-{}", seed % 12),
        status,
        stock: (seed % 40) as i64,
        rating: ((seed % 50) as f64) / 10.0,
        images: vec![ProductImage {
            url: format!("https://picsum.photos/seed/{id}/600/600"),
            alt: item.to_string(),
        }],
        variants,
        shipping: ShippingInfo {
            weight_grams: 100 + (seed % 20) as i64 * 50,
            free_shipping: base_cents > 3000,
            ships_from: "Lahore".to_string(),
            estimated_days: 2 + (seed % 5) as i64,
        },
        tags: vec![department.to_ascii_lowercase()],
        search_keywords: item
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect(),
        created_at: created.to_rfc3339(),
        updated_at: created.to_rfc3339(),
        id,
    }
}
