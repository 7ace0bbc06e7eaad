//! # Cache Reader
//!
//! The read-only face of the cache handed to UI code.
//!
//! Screens hold a `CacheReader` instead of a [`Database`], so the only
//! writers left are the sync workers and the few direct-write calls on
//! [`SyncCoordinator`](crate::coordinator::SyncCoordinator).

use bazaar_core::{Category, Product, SyncStateEntry, User};
use bazaar_db::{CategoryFilter, Database, DbResult, ObserveStream, ProductFilter, UserFilter};

/// Read-only access to cached collections.
#[derive(Debug, Clone)]
pub struct CacheReader {
    db: Database,
}

impl CacheReader {
    pub fn new(db: Database) -> Self {
        CacheReader { db }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Live product list. Emits the current rows first, then again after
    /// every committed product write.
    pub fn observe_products(&self, filter: ProductFilter) -> ObserveStream<Product> {
        self.db.products().observe(filter)
    }

    pub async fn products(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        self.db.products().query(filter).await
    }

    /// Case-insensitive search over title, category and keywords.
    /// A blank query returns nothing.
    pub async fn search_products(&self, query: &str) -> DbResult<Vec<Product>> {
        self.db.products().search_by_text(query).await
    }

    pub async fn product(&self, id: &str) -> DbResult<Option<Product>> {
        self.db.products().get_by_id(id).await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn observe_categories(&self, filter: CategoryFilter) -> ObserveStream<Category> {
        self.db.categories().observe(filter)
    }

    pub async fn categories(&self, filter: &CategoryFilter) -> DbResult<Vec<Category>> {
        self.db.categories().query(filter).await
    }

    pub async fn category(&self, id: &str) -> DbResult<Option<Category>> {
        self.db.categories().get_by_id(id).await
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn user(&self, id: &str) -> DbResult<Option<User>> {
        self.db.users().get_by_id(id).await
    }

    pub fn observe_users(&self, filter: UserFilter) -> ObserveStream<User> {
        self.db.users().observe(filter)
    }

    // =========================================================================
    // Bookkeeping
    // =========================================================================

    /// Live per-collection sync bookkeeping, for "last updated" copy.
    pub fn observe_sync_state(&self) -> ObserveStream<SyncStateEntry> {
        self.db.sync_state().observe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{Collection, Document};
    use bazaar_db::DbConfig;
    use futures_util::StreamExt;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::apply::apply_documents;

    #[tokio::test]
    async fn test_reads_follow_applied_snapshots() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let reader = CacheReader::new(db.clone());
        let mut active = reader.observe_products(ProductFilter::ActiveOnly);

        let initial = timeout(Duration::from_secs(5), active.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(initial.is_empty());

        let docs = vec![
            Document::new(
                "p-1",
                json!({ "title": "Copper Mug", "status": "active", "searchKeywords": ["cup"] }),
            ),
            Document::new("p-2", json!({ "title": "Brass Mug", "status": "pending" })),
        ];
        apply_documents(&db, Collection::Products, &docs).await.unwrap();

        let emitted = timeout(Duration::from_secs(5), active.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].id, "p-1");

        assert_eq!(reader.search_products("MUG").await.unwrap().len(), 2);
        assert_eq!(reader.search_products("cup").await.unwrap().len(), 1);
        assert!(reader.search_products("   ").await.unwrap().is_empty());
        assert_eq!(
            reader.product("p-2").await.unwrap().unwrap().title,
            "Brass Mug"
        );
        assert!(reader.product("p-9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_categories_and_users() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let reader = CacheReader::new(db.clone());

        apply_documents(
            &db,
            Collection::Categories,
            &[
                Document::new("c-1", json!({ "name": "Home" })),
                Document::new("c-2", json!({ "name": "Lamps", "parentId": "c-1" })),
            ],
        )
        .await
        .unwrap();
        apply_documents(
            &db,
            Collection::Users,
            &[Document::new("u-1", json!({ "displayName": "Sana", "role": "seller" }))],
        )
        .await
        .unwrap();

        let top = reader.categories(&CategoryFilter::TopLevel).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(reader.category("c-2").await.unwrap().unwrap().name, "Lamps");
        assert_eq!(reader.user("u-1").await.unwrap().unwrap().display_name, "Sana");

        let mut state = reader.observe_sync_state();
        let entries = timeout(Duration::from_secs(5), state.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(entries.len(), 2);
    }
}
