//! PostgreSQL document store tests
//!
//! Run explicitly against a database:
//! `DATABASE_URL=postgres://... cargo test --test store_tests -- --ignored`

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use catalogue_server::store::{DocumentStore, MemoryDocumentStore, PgDocumentStore};

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_insert_and_find(pool: PgPool) {
    let store = PgDocumentStore::new(pool);

    let ids = store
        .insert_many("readings", vec![json!({"t": 1}), json!({"t": 2}), json!({"t": 3})])
        .await
        .unwrap();
    assert_eq!(ids.len(), 3);

    let docs = store.find_all("readings").await.unwrap();
    let values: Vec<_> = docs.iter().map(|d| d.body["t"].clone()).collect();
    assert_eq!(values, vec![json!(1), json!(2), json!(3)]);

    let found = store.find_by_id("readings", ids[1]).await.unwrap().unwrap();
    assert_eq!(found.body["t"], 2);
    assert!(store.find_by_id("other", ids[1]).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_find_by_field_matches_text(pool: PgPool) {
    let store = PgDocumentStore::new(pool);
    store
        .insert_many(
            "assets",
            vec![json!({"pilot": "north"}), json!({"pilot": "south"}), json!({"pilot": "north"})],
        )
        .await
        .unwrap();

    let north = store.find_by_field("assets", "pilot", "north").await.unwrap();
    assert_eq!(north.len(), 2);
    assert!(store.find_by_field("assets", "pilot", "east").await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_delete_returns_removed_document(pool: PgPool) {
    let store = PgDocumentStore::new(pool);
    let ids = store
        .insert_many("connectors", vec![json!({"name": "kafka"})])
        .await
        .unwrap();

    let removed = store.delete_by_id("connectors", ids[0]).await.unwrap().unwrap();
    assert_eq!(removed.body["name"], "kafka");
    assert!(store.delete_by_id("connectors", ids[0]).await.unwrap().is_none());
    assert!(store
        .delete_by_id("connectors", Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_distinct_names(pool: PgPool) {
    let store = PgDocumentStore::new(pool);
    store
        .insert_many(
            "connectors",
            vec![json!({"name": "mongodb"}), json!({"name": "kafka"}), json!({"name": "mongodb"})],
        )
        .await
        .unwrap();

    let names = store.distinct("connectors", "name").await.unwrap();
    assert_eq!(names, vec!["kafka", "mongodb"]);
    store.ping().await.unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_distinct_matches_memory_store(pool: PgPool) {
    let documents = vec![
        json!({"name": "alpha"}),
        json!({"name": "Zeta"}),
        json!({"name": {"nested": true}}),
        json!({"name": ["kafka"]}),
        json!({"name": 7}),
    ];

    let store = PgDocumentStore::new(pool);
    store.insert_many("connectors", documents.clone()).await.unwrap();
    let memory = MemoryDocumentStore::new();
    memory.insert_many("connectors", documents).await.unwrap();

    let names = store.distinct("connectors", "name").await.unwrap();
    assert_eq!(names, vec!["7", "Zeta", "alpha"]);
    assert_eq!(names, memory.distinct("connectors", "name").await.unwrap());
}
