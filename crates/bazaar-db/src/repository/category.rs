//! # Category Repository
//!
//! Cache operations for the category tree. Categories are read far more
//! often than written, so every read is a plain indexed scan ordered by
//! `sort_order`.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use bazaar_core::Category;

use crate::entity::{CategoryRow, CATEGORY_COLUMNS};
use crate::error::{DbError, DbResult};
use crate::filter::CategoryFilter;
use crate::notify::{ChangeNotifier, Table};
use crate::ObserveStream;
use crate::repository::observe_table;

const UPSERT_SQL: &str = r#"
    INSERT INTO categories (
        id, name, description, image_url, parent_id, subcategories,
        is_active, sort_order, created_at, updated_at, cached_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        description = excluded.description,
        image_url = excluded.image_url,
        parent_id = excluded.parent_id,
        subcategories = excluded.subcategories,
        is_active = excluded.is_active,
        sort_order = excluded.sort_order,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at,
        cached_at = excluded.cached_at
"#;

/// Repository for cached categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
    changes: ChangeNotifier,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool, changes: ChangeNotifier) -> Self {
        CategoryRepository { pool, changes }
    }

    /// Inserts or replaces a batch by id inside one transaction.
    pub async fn upsert_all(&self, categories: &[Category]) -> DbResult<usize> {
        if categories.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        for category in categories {
            let row = CategoryRow::from(category);
            sqlx::query(UPSERT_SQL)
                .bind(&row.id)
                .bind(&row.name)
                .bind(&row.description)
                .bind(&row.image_url)
                .bind(&row.parent_id)
                .bind(&row.subcategories)
                .bind(row.is_active)
                .bind(row.sort_order)
                .bind(&row.created_at)
                .bind(&row.updated_at)
                .bind(row.cached_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await.map_err(DbError::transaction)?;
        self.changes.notify(Table::Categories);

        debug!(count = categories.len(), "Upserted categories");
        Ok(categories.len())
    }

    pub async fn upsert(&self, category: &Category) -> DbResult<()> {
        self.upsert_all(std::slice::from_ref(category)).await?;
        Ok(())
    }

    pub async fn query(&self, filter: &CategoryFilter) -> DbResult<Vec<Category>> {
        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT {CATEGORY_COLUMNS} FROM categories"));
        filter.push_sql(&mut qb);

        let rows = qb
            .build_query_as::<CategoryRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Live view of `filter`, re-emitted after every write to `categories`.
    pub fn observe(&self, filter: CategoryFilter) -> ObserveStream<Category> {
        let repo = self.clone();
        observe_table(&self.changes, Table::Categories, move || {
            let repo = repo.clone();
            let filter = filter.clone();
            async move { repo.query(&filter).await }
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1");
        let row: Option<CategoryRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Category::from))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes a category. Deleting an unknown id succeeds.
    pub async fn delete_by_id(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.changes.notify(Table::Categories);
        }
        Ok(removed)
    }

    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM categories")
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            self.changes.notify(Table::Categories);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn category(id: &str, name: &str, parent: Option<&str>, sort_order: i64) -> Category {
        Category {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            image_url: String::new(),
            parent_id: parent.map(String::from),
            subcategories: Vec::new(),
            is_active: true,
            sort_order,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn names(categories: &[Category]) -> Vec<&str> {
        categories.iter().map(|c| c.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_tree_filters_and_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let mut hidden = category("c-4", "Archive", None, 0);
        hidden.is_active = false;
        repo.upsert_all(&[
            category("c-1", "Kitchen", None, 2),
            category("c-2", "Garden", None, 1),
            category("c-3", "Mugs", Some("c-1"), 0),
            hidden,
        ])
        .await
        .unwrap();

        let top = repo.query(&CategoryFilter::TopLevel).await.unwrap();
        assert_eq!(names(&top), vec!["Archive", "Garden", "Kitchen"]);

        let active = repo.query(&CategoryFilter::ActiveOnly).await.unwrap();
        assert_eq!(names(&active), vec!["Mugs", "Garden", "Kitchen"]);

        let children = repo
            .query(&CategoryFilter::ChildrenOf("c-1".into()))
            .await
            .unwrap();
        assert_eq!(names(&children), vec!["Mugs"]);
    }

    #[tokio::test]
    async fn test_get_delete_clear() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();
        repo.upsert(&category("c-1", "Kitchen", None, 0)).await.unwrap();

        assert_eq!(repo.get_by_id("c-1").await.unwrap().unwrap().name, "Kitchen");
        assert!(repo.get_by_id("nope").await.unwrap().is_none());

        assert!(repo.delete_by_id("c-1").await.unwrap());
        assert!(!repo.delete_by_id("c-1").await.unwrap());
        assert_eq!(repo.clear().await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
