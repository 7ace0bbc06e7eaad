//! End-to-end scenarios: remote backend → coordinator → cache → reader.

use futures_util::StreamExt;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use bazaar_core::{Collection, Product};
use bazaar_db::{Database, DbConfig, ObserveStream, ProductFilter};
use bazaar_sync::{
    CollectionState, MemoryBackend, RemoteError, SyncConfig, SyncCoordinator, SyncEvent,
};

const WAIT: Duration = Duration::from_secs(5);

fn config(collections: &[Collection]) -> SyncConfig {
    let mut config = SyncConfig::default();
    config.sync.collections = collections.to_vec();
    config
}

async fn next_rows(stream: &mut ObserveStream<Product>) -> Vec<Product> {
    timeout(WAIT, stream.next())
        .await
        .expect("observe timed out")
        .expect("observe stream ended")
        .expect("observe query failed")
}

async fn wait_for_state(coordinator: &SyncCoordinator, collection: Collection, want: CollectionState) {
    let mut rx = coordinator.watch_state(collection).expect("collection configured");
    timeout(WAIT, rx.wait_for(|s| *s == want))
        .await
        .expect("state timed out")
        .expect("state channel closed");
}

fn temp_db_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bazaar-{}-{}.db", name, std::process::id()))
}

#[tokio::test]
async fn unparseable_price_is_dropped_without_a_notice() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let backend = MemoryBackend::new();
    backend.set(
        Collection::Products,
        "p-1",
        json!({ "title": "Clay Mug", "price": 9.99, "status": "active" }),
    );
    backend.set(
        Collection::Products,
        "p-2",
        json!({ "title": "Glass Vase", "price": { "amount": 20 }, "status": "active" }),
    );
    backend.set(
        Collection::Products,
        "p-3",
        json!({ "title": "Wool Rug", "price": "45.50", "status": "active" }),
    );

    let coordinator = SyncCoordinator::new(
        db.clone(),
        Arc::new(backend.clone()),
        config(&[Collection::Products]),
    );
    let mut events = coordinator.subscribe_events();
    let mut active = coordinator
        .reader()
        .observe_products(ProductFilter::ActiveOnly);
    assert!(next_rows(&mut active).await.is_empty());

    coordinator.start_sync();

    let rows = next_rows(&mut active).await;
    let ids: Vec<_> = rows.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p-1", "p-3"]);
    assert_eq!(rows[1].price.cents(), 4550);

    wait_for_state(&coordinator, Collection::Products, CollectionState::Streaming).await;
    assert_eq!(events.try_recv(), None);

    let bookkeeping = db.sync_state().get(Collection::Products).await.unwrap().unwrap();
    assert_eq!(bookkeeping.document_count, 2);
    assert!(!bookkeeping.is_failing());

    coordinator.stop_sync().await;
    assert_eq!(backend.active_listeners(Collection::Products), 0);
}

#[tokio::test]
async fn active_filter_follows_status_changes() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let backend = MemoryBackend::new();
    backend.set(Collection::Products, "a", json!({ "title": "A", "status": "active" }));
    backend.set(Collection::Products, "b", json!({ "title": "B", "status": "inactive" }));

    let coordinator =
        SyncCoordinator::new(db, Arc::new(backend.clone()), config(&[Collection::Products]));
    coordinator.start_sync();
    wait_for_state(&coordinator, Collection::Products, CollectionState::Streaming).await;

    let mut active = coordinator
        .reader()
        .observe_products(ProductFilter::ActiveOnly);
    let mut rows = next_rows(&mut active).await;
    while rows.len() != 1 {
        rows = next_rows(&mut active).await;
    }
    assert_eq!(rows[0].id, "a");

    backend.set(Collection::Products, "b", json!({ "title": "B", "status": "active" }));
    let mut rows = next_rows(&mut active).await;
    while rows.len() != 2 {
        rows = next_rows(&mut active).await;
    }
    let ids: Vec<_> = rows.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn cached_data_survives_failures_and_restarts() {
    let path = temp_db_path("survives");
    let backend = MemoryBackend::new();
    backend.set(Collection::Products, "p-1", json!({ "title": "Kettle", "price": 30 }));
    backend.set(Collection::Categories, "c-1", json!({ "name": "Kitchen" }));

    // First session: online, fills the cache.
    {
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let coordinator = SyncCoordinator::new(
            db.clone(),
            Arc::new(backend.clone()),
            config(&[Collection::Products, Collection::Categories]),
        );
        coordinator.manual_sync().await;
        assert_eq!(db.products().count().await.unwrap(), 1);
        assert_eq!(db.categories().count().await.unwrap(), 1);
        db.close().await;
    }

    // Second session: backend unreachable.
    backend.set_listen_failure(
        Collection::Products,
        Some(RemoteError::Unavailable("no network".into())),
    );
    backend.set_fetch_failure(
        Collection::Products,
        Some(RemoteError::Unavailable("no network".into())),
    );

    let db = Database::new(DbConfig::new(&path)).await.unwrap();
    let coordinator = SyncCoordinator::new(
        db.clone(),
        Arc::new(backend.clone()),
        config(&[Collection::Products, Collection::Categories]),
    );

    coordinator.start_sync();
    wait_for_state(&coordinator, Collection::Products, CollectionState::Failed).await;

    coordinator.manual_sync().await;

    let reader = coordinator.reader();
    let saved = reader.products(&ProductFilter::All).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].title, "Kettle");

    // A screen opened after both failures still learns about the last one.
    let mut late = coordinator.subscribe_events();
    assert_eq!(
        late.try_recv(),
        Some(SyncEvent::SyncFailed(
            coordinator.config().notices.refresh_failed.clone()
        ))
    );
    assert_eq!(late.try_recv(), None);

    // Network back: a restart resubscribes the failed collection only.
    backend.set_listen_failure(Collection::Products, None);
    backend.set_fetch_failure(Collection::Products, None);
    backend.set(Collection::Products, "p-2", json!({ "title": "Toaster", "price": 25 }));

    coordinator.start_sync();
    wait_for_state(&coordinator, Collection::Products, CollectionState::Streaming).await;
    assert_eq!(backend.active_listeners(Collection::Products), 1);
    assert_eq!(backend.active_listeners(Collection::Categories), 1);

    let mut all = reader.observe_products(ProductFilter::All);
    let mut rows = next_rows(&mut all).await;
    while rows.len() != 2 {
        rows = next_rows(&mut all).await;
    }

    coordinator.stop_sync().await;
    db.close().await;
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(path.with_extension("db-wal"));
    let _ = std::fs::remove_file(path.with_extension("db-shm"));
}

#[tokio::test]
async fn dropping_the_coordinator_detaches_listeners() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let backend = MemoryBackend::new();

    let coordinator = SyncCoordinator::new(
        db,
        Arc::new(backend.clone()),
        config(&[Collection::Products, Collection::Users]),
    );
    coordinator.start_sync();
    wait_for_state(&coordinator, Collection::Products, CollectionState::Streaming).await;
    wait_for_state(&coordinator, Collection::Users, CollectionState::Streaming).await;

    drop(coordinator);

    timeout(WAIT, async {
        while backend.active_listeners(Collection::Products) > 0
            || backend.active_listeners(Collection::Users) > 0
        {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("listeners still attached");
}

#[tokio::test]
async fn search_ignores_blank_queries() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let backend = MemoryBackend::new();
    backend.set(
        Collection::Products,
        "p-1",
        json!({ "title": "Silk Scarf", "categoryName": "Apparel", "searchKeywords": ["shawl"] }),
    );

    let coordinator =
        SyncCoordinator::new(db, Arc::new(backend), config(&[Collection::Products]));
    coordinator.manual_sync().await;

    let reader = coordinator.reader();
    assert!(reader.search_products("").await.unwrap().is_empty());
    assert_eq!(reader.search_products("apparel").await.unwrap().len(), 1);
    assert_eq!(reader.search_products("SHAWL").await.unwrap().len(), 1);
    assert!(reader.search_products("boots").await.unwrap().is_empty());
}
