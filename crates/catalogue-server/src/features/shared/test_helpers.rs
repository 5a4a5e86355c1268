//! Test fixtures for handler tests
//!
//! ```rust,ignore
//! let state = test_state(tempdir.path());
//! let asset = TestAsset::new("pilot-a")
//!     .with_parameter("collection", "readings")
//!     .insert(state.store.as_ref())
//!     .await;
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use catalogue_common::types::{Asset, AssetDraft, AssetModel, Interface, Parameter};

use crate::bridge::{BridgeError, ByteStream, FilesystemBridge};
use crate::features::FeatureState;
use crate::hooks::{HookConfig, HookRegistry};
use crate::ingest::{ImportConfig, ImportPipeline};
use crate::store::{insert_one, DocumentStore, MemoryDocumentStore, SharedStore, ASSETS_COLLECTION};

/// Builder for registered test assets
#[derive(Debug, Clone)]
pub struct TestAsset {
    draft: AssetDraft,
}

impl TestAsset {
    pub fn new(pilot: &str) -> Self {
        Self {
            draft: AssetDraft {
                model: AssetModel {
                    description: "Test asset".to_string(),
                    kind: "dataset".to_string(),
                    format: "json".to_string(),
                },
                pilot: pilot.to_string(),
                interface: Interface {
                    connector: "mongodb".to_string(),
                    protocol: "mongodb".to_string(),
                    parameters: Vec::new(),
                },
            },
        }
    }

    pub fn with_connector(mut self, connector: &str) -> Self {
        self.draft.interface.connector = connector.to_string();
        self
    }

    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.draft.interface.parameters.push(Parameter::new(name, value));
        self
    }

    pub fn draft(&self) -> AssetDraft {
        self.draft.clone()
    }

    pub async fn insert(self, store: &dyn DocumentStore) -> Asset {
        let body = serde_json::to_value(&self.draft).unwrap();
        let id = insert_one(store, ASSETS_COLLECTION, body).await.unwrap();
        Asset::from_draft(id, self.draft)
    }
}

/// Bridge that records copies and serves files from memory
#[derive(Debug, Default)]
pub struct RecordingBridge {
    pub puts: Mutex<Vec<(PathBuf, String)>>,
    pub files: Mutex<Vec<(String, Bytes)>>,
}

#[async_trait]
impl FilesystemBridge for RecordingBridge {
    async fn put_file(&self, local: &Path, remote: &str) -> Result<(), BridgeError> {
        let contents = tokio::fs::read(local).await?;
        self.puts
            .lock()
            .unwrap()
            .push((local.to_path_buf(), remote.to_string()));
        self.files
            .lock()
            .unwrap()
            .push((remote.to_string(), Bytes::from(contents)));
        Ok(())
    }

    async fn get_file(&self, remote: &str) -> Result<ByteStream, BridgeError> {
        let found = self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|(path, _)| path == remote)
            .map(|(_, bytes)| bytes.clone());
        match found {
            Some(bytes) => Ok(Box::pin(futures::stream::once(async move { Ok(bytes) }))),
            None => Err(BridgeError::NotFound(remote.to_string())),
        }
    }

    async fn list_directory(&self, remote: &str) -> Result<Vec<String>, BridgeError> {
        let prefix = format!("{}/", remote.trim_end_matches('/'));
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(path, _)| path.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}

/// Feature state over an in-memory store and a recording bridge
pub fn test_state(work_dir: &Path) -> (FeatureState, Arc<RecordingBridge>) {
    let store: SharedStore = Arc::new(MemoryDocumentStore::new());
    let bridge = Arc::new(RecordingBridge::default());
    let config = ImportConfig::new()
        .with_staging_dir(work_dir.join("staging"))
        .with_import_root(work_dir.join("imports"));

    let state = FeatureState {
        store: store.clone(),
        bridge: bridge.clone(),
        hooks: Arc::new(HookRegistry::with_defaults(&HookConfig::default())),
        pipeline: Arc::new(ImportPipeline::new(store, bridge.clone(), &config)),
        import_root: config.import_root,
    };
    (state, bridge)
}
