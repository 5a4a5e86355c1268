//! Document store interface
//!
//! Every registry and every asset data collection is a named collection of
//! JSON documents. The store assigns identifiers on insert and exposes them
//! as the `_id` field when documents are read back.
//!
//! Two implementations exist:
//! - [`postgres::PgDocumentStore`]: JSONB rows in PostgreSQL
//! - [`memory::MemoryDocumentStore`]: process-local, for tests and development

use async_trait::async_trait;
use catalogue_common::types::RECORD_ID_FIELD;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Collection holding registered assets
pub const ASSETS_COLLECTION: &str = "assets";

/// Collection holding registered connectors
pub const CONNECTORS_COLLECTION: &str = "connectors";

/// Shared handle to the process-wide store
pub type SharedStore = Arc<dyn DocumentStore>;

/// Errors raised by a document store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Stored document in '{collection}' is malformed: {source}")]
    Malformed {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store returned no identifier for the inserted document")]
    MissingId,
}

/// A document together with its store-assigned identifier
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: Uuid,
    pub body: Value,
}

impl StoredDocument {
    /// The document as clients see it: the body with `_id` set to the stored id
    pub fn into_json(self) -> Value {
        let mut map = match self.body {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            },
        };
        map.insert(RECORD_ID_FIELD.to_string(), Value::String(self.id.to_string()));
        Value::Object(map)
    }

    /// Decode the body into a typed record
    pub fn decode<T: serde::de::DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<T, StoreError> {
        serde_json::from_value(self.body.clone()).map_err(|source| StoreError::Malformed {
            collection: collection.to_string(),
            source,
        })
    }
}

/// Storage client used by the registries and the import pipeline
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append documents to a collection, returning the assigned ids in input order
    async fn insert_many(&self, collection: &str, documents: Vec<Value>)
        -> Result<Vec<Uuid>, StoreError>;

    /// All documents of a collection, in insertion order
    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// Documents whose top-level `field` equals `value` (compared as text)
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: Uuid)
        -> Result<Option<StoredDocument>, StoreError>;

    /// Remove a document, returning it if it existed
    async fn delete_by_id(&self, collection: &str, id: Uuid)
        -> Result<Option<StoredDocument>, StoreError>;

    /// Distinct text values of a top-level field, sorted
    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<String>, StoreError>;

    /// Cheap round trip used by the health endpoint
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Insert a single document
pub async fn insert_one(
    store: &dyn DocumentStore,
    collection: &str,
    document: Value,
) -> Result<Uuid, StoreError> {
    store
        .insert_many(collection, vec![document])
        .await?
        .into_iter()
        .next()
        .ok_or(StoreError::MissingId)
}

/// Text form of a JSON scalar used for field comparisons
pub(crate) fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
