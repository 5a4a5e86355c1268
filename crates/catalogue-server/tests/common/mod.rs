//! Shared fixtures for catalogue server integration tests
//!
//! Everything runs in-process: an in-memory document store wrapped to count
//! bulk writes, and a bridge that records copies instead of talking to a
//! filesystem.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

use catalogue_server::{
    api::{self, AppState},
    bridge::{BridgeError, ByteStream, FilesystemBridge},
    config::Config,
    hooks::{HookConfig, HookRegistry},
    ingest::ImportConfig,
    store::{DocumentStore, MemoryDocumentStore, SharedStore, StoreError, StoredDocument},
};

// ============================================================================
// Store
// ============================================================================

/// Memory store that remembers every bulk write
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryDocumentStore,
    pub writes: Mutex<Vec<(String, usize)>>,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sizes of the bulk writes issued against `collection`, in order
    pub fn batch_sizes(&self, collection: &str) -> Vec<usize> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == collection)
            .map(|(_, n)| *n)
            .collect()
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<Vec<Uuid>, StoreError> {
        self.writes
            .lock()
            .unwrap()
            .push((collection.to_string(), documents.len()));
        self.inner.insert_many(collection, documents).await
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.inner.find_all(collection).await
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.inner.find_by_field(collection, field, value).await
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.inner.find_by_id(collection, id).await
    }

    async fn delete_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.inner.delete_by_id(collection, id).await
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<String>, StoreError> {
        self.inner.distinct(collection, field).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// Bridge
// ============================================================================

/// One copy seen by the bridge
#[derive(Debug, Clone)]
pub struct RecordedPut {
    pub local: PathBuf,
    pub remote: String,
    pub contents: Bytes,
}

/// Bridge that keeps copied files in memory
#[derive(Default)]
pub struct RecordingBridge {
    pub puts: Mutex<Vec<RecordedPut>>,
}

impl RecordingBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().unwrap().clone()
    }

    /// Poll until `count` copies were recorded or a second has passed
    pub async fn wait_for_puts(&self, count: usize) -> Vec<RecordedPut> {
        for _ in 0..100 {
            let puts = self.puts();
            if puts.len() >= count {
                return puts;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.puts()
    }
}

#[async_trait]
impl FilesystemBridge for RecordingBridge {
    async fn put_file(&self, local: &Path, remote: &str) -> Result<(), BridgeError> {
        let contents = tokio::fs::read(local).await?;
        self.puts.lock().unwrap().push(RecordedPut {
            local: local.to_path_buf(),
            remote: remote.to_string(),
            contents: Bytes::from(contents),
        });
        Ok(())
    }

    async fn get_file(&self, remote: &str) -> Result<ByteStream, BridgeError> {
        let found = self
            .puts()
            .into_iter()
            .find(|put| put.remote == remote)
            .map(|put| put.contents);
        match found {
            Some(bytes) => Ok(Box::pin(futures::stream::once(async move { Ok(bytes) }))),
            None => Err(BridgeError::NotFound(remote.to_string())),
        }
    }

    async fn list_directory(&self, remote: &str) -> Result<Vec<String>, BridgeError> {
        let prefix = format!("{}/", remote.trim_end_matches('/'));
        Ok(self
            .puts()
            .into_iter()
            .filter_map(|put| put.remote.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}

// ============================================================================
// Application
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub store: Arc<CountingStore>,
    pub bridge: Arc<RecordingBridge>,
    pub staging_dir: PathBuf,
    pub import_root: PathBuf,
}

impl TestApp {
    pub fn new(work_dir: &Path) -> Self {
        let store = CountingStore::new();
        let bridge = RecordingBridge::new();
        let import = ImportConfig::new()
            .with_staging_dir(work_dir.join("staging"))
            .with_import_root(work_dir.join("imports"));

        let shared: SharedStore = store.clone();
        let state = AppState::new(
            shared,
            bridge.clone(),
            HookRegistry::with_defaults(&HookConfig::default()),
            &import,
        );

        Self {
            router: api::create_router(state, &Config::default()),
            store,
            bridge,
            staging_dir: import.staging_dir,
            import_root: import.import_root,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn get_bytes(&self, uri: &str) -> (StatusCode, Bytes) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).method(method);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

/// Embedded asset registration payload
pub fn asset_payload(pilot: &str, connector: &str, parameters: &[(&str, &str)]) -> Value {
    let parameters: Vec<Value> = parameters
        .iter()
        .map(|(name, value)| serde_json::json!({"name": name, "value": value}))
        .collect();

    serde_json::json!({
        "model": {"description": "Line sensors", "type": "timeseries", "format": "json"},
        "pilot": pilot,
        "interface": {"connector": connector, "protocol": "tcp", "parameters": parameters}
    })
}
