//! # Product Repository
//!
//! Cache operations for products.
//!
//! ## Key Operations
//! - Batch upsert of a snapshot in one transaction
//! - Observable, filtered reads
//! - Substring search over title, category and keywords
//!
//! ## Text Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How search_by_text Works                             │
//! │                                                                         │
//! │  User types: "  50%  "                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  trim → "50%"          (empty after trim? return [] without SQL)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  escape → "50\%"       (so % and _ match literally)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LIKE '%50\%%' ESCAPE '\'  on                                           │
//! │    title | category_name | each element of search_keywords              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Results ordered by title, id                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite's `LIKE` is case-insensitive for ASCII only.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use bazaar_core::Product;

use crate::entity::{ProductRow, PRODUCT_COLUMNS};
use crate::error::{DbError, DbResult};
use crate::filter::ProductFilter;
use crate::notify::{ChangeNotifier, Table};
use crate::ObserveStream;
use crate::repository::{escape_like, observe_table};

const UPSERT_SQL: &str = r#"
    INSERT INTO products (
        id, title, description, price_cents, compare_at_price_cents, currency,
        category_id, category_name, seller_id, status, stock, rating,
        images, variants, shipping, tags, search_keywords,
        created_at, updated_at, cached_at
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6,
        ?7, ?8, ?9, ?10, ?11, ?12,
        ?13, ?14, ?15, ?16, ?17,
        ?18, ?19, ?20
    )
    ON CONFLICT(id) DO UPDATE SET
        title = excluded.title,
        description = excluded.description,
        price_cents = excluded.price_cents,
        compare_at_price_cents = excluded.compare_at_price_cents,
        currency = excluded.currency,
        category_id = excluded.category_id,
        category_name = excluded.category_name,
        seller_id = excluded.seller_id,
        status = excluded.status,
        stock = excluded.stock,
        rating = excluded.rating,
        images = excluded.images,
        variants = excluded.variants,
        shipping = excluded.shipping,
        tags = excluded.tags,
        search_keywords = excluded.search_keywords,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at,
        cached_at = excluded.cached_at
"#;

/// Repository for cached products.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // Mirror a snapshot
/// repo.upsert_all(&products).await?;
///
/// // Live list of visible products
/// let mut stream = repo.observe(ProductFilter::ActiveOnly);
/// while let Some(Ok(products)) = stream.next().await { /* render */ }
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    changes: ChangeNotifier,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool, changes: ChangeNotifier) -> Self {
        ProductRepository { pool, changes }
    }

    /// Inserts or replaces a batch by id inside one transaction.
    ///
    /// All-or-nothing: on error nothing from the batch is visible. A batch
    /// that repeats an id keeps the last occurrence. An empty batch is a
    /// no-op and does not wake observers.
    ///
    /// ## Returns
    /// Number of rows written.
    pub async fn upsert_all(&self, products: &[Product]) -> DbResult<usize> {
        if products.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        for product in products {
            let row = ProductRow::from(product);
            sqlx::query(UPSERT_SQL)
                .bind(&row.id)
                .bind(&row.title)
                .bind(&row.description)
                .bind(row.price_cents)
                .bind(row.compare_at_price_cents)
                .bind(&row.currency)
                .bind(&row.category_id)
                .bind(&row.category_name)
                .bind(&row.seller_id)
                .bind(&row.status)
                .bind(row.stock)
                .bind(row.rating)
                .bind(&row.images)
                .bind(&row.variants)
                .bind(&row.shipping)
                .bind(&row.tags)
                .bind(&row.search_keywords)
                .bind(&row.created_at)
                .bind(&row.updated_at)
                .bind(row.cached_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await.map_err(DbError::transaction)?;
        self.changes.notify(Table::Products);

        debug!(count = products.len(), "Upserted products");
        Ok(products.len())
    }

    /// Inserts or replaces a single product.
    pub async fn upsert(&self, product: &Product) -> DbResult<()> {
        self.upsert_all(std::slice::from_ref(product)).await?;
        Ok(())
    }

    /// One-shot read of every product matching `filter`.
    pub async fn query(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        filter.push_sql(&mut qb);

        let rows: Vec<ProductRow> = qb.build_query_as::<ProductRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Live view of `filter`: the current result set now, then again after
    /// every committed write to `products`.
    pub fn observe(&self, filter: ProductFilter) -> ObserveStream<Product> {
        let repo = self.clone();
        observe_table(&self.changes, Table::Products, move || {
            let repo = repo.clone();
            let filter = filter.clone();
            async move { repo.query(&filter).await }
        })
    }

    /// Case-insensitive substring search over title, category name and
    /// search keywords.
    ///
    /// A query that is empty after trimming returns no results.
    pub async fn search_by_text(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        debug!(query = %query, "Searching products");

        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE title LIKE ?1 ESCAPE '\'
               OR category_name LIKE ?1 ESCAPE '\'
               OR EXISTS (
                    SELECT 1 FROM json_each(
                        CASE WHEN json_valid(products.search_keywords)
                             THEN products.search_keywords ELSE '[]' END
                    ) AS kw
                    WHERE kw.value LIKE ?1 ESCAPE '\'
               )
            ORDER BY title, id
            "#
        );

        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Search returned products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Gets a product by its remote id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    /// Counts cached products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes a product. Deleting an unknown id succeeds.
    ///
    /// ## Returns
    /// `true` if a row was removed.
    pub async fn delete_by_id(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.changes.notify(Table::Products);
            debug!(id = %id, "Deleted product");
        }
        Ok(removed)
    }

    /// Removes every cached product. Clearing an empty table succeeds.
    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            self.changes.notify(Table::Products);
        }
        debug!(removed, "Cleared products");
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
