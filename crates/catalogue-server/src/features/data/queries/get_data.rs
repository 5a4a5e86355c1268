use serde::Serialize;
use serde_json::Value;

use crate::bridge::{BridgeError, FilesystemBridge};
use crate::features::assets::find_asset;
use crate::ingest::Destination;
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Clone)]
pub struct GetDataQuery {
    pub asset_id: String,
}

/// What an asset's destination currently holds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataContents {
    Collection {
        collection: String,
        records: Vec<Value>,
    },
    Directory {
        directory: String,
        message: String,
        files: Vec<String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum GetDataError {
    #[error("Asset '{0}' not found")]
    AssetNotFound(String),
    #[error("Asset '{0}' has neither a collection nor a directory parameter")]
    Unresolved(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

#[tracing::instrument(skip(store, bridge))]
pub async fn handle(
    store: &dyn DocumentStore,
    bridge: &dyn FilesystemBridge,
    query: GetDataQuery,
) -> Result<DataContents, GetDataError> {
    let asset = find_asset(store, &query.asset_id)
        .await?
        .ok_or_else(|| GetDataError::AssetNotFound(query.asset_id.clone()))?;

    match Destination::resolve(&asset) {
        Destination::Collection(collection) => {
            let records = store
                .find_all(&collection)
                .await?
                .into_iter()
                .map(|d| d.into_json())
                .collect();
            Ok(DataContents::Collection {
                collection,
                records,
            })
        },
        Destination::FilesystemDirectory(directory) => {
            // Nothing copied yet
            let files = match bridge.list_directory(&directory).await {
                Ok(files) => files,
                Err(BridgeError::NotFound(_)) => Vec::new(),
                Err(e) => return Err(e.into()),
            };
            Ok(DataContents::Directory {
                message: format!("Data is stored in Hadoop in {}", directory),
                directory,
                files,
            })
        },
        Destination::Unresolved => Err(GetDataError::Unresolved(query.asset_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{RecordingBridge, TestAsset};
    use crate::store::MemoryDocumentStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_collection_contents() {
        let store = MemoryDocumentStore::new();
        let bridge = RecordingBridge::default();
        let asset = TestAsset::new("p")
            .with_parameter("collection", "readings")
            .insert(&store)
            .await;
        store.insert_many("readings", vec![json!({"t": 1})]).await.unwrap();

        let contents = handle(&store, &bridge, GetDataQuery { asset_id: asset.id.to_string() })
            .await
            .unwrap();
        match contents {
            DataContents::Collection { collection, records } => {
                assert_eq!(collection, "readings");
                assert_eq!(records.len(), 1);
                assert_eq!(records[0]["t"], 1);
            },
            other => panic!("unexpected contents {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_directory_lists_nothing() {
        let store = MemoryDocumentStore::new();
        let bridge = RecordingBridge::default();
        let asset = TestAsset::new("p")
            .with_parameter("directory", "/data/raw")
            .insert(&store)
            .await;

        let contents = handle(&store, &bridge, GetDataQuery { asset_id: asset.id.to_string() })
            .await
            .unwrap();
        assert_eq!(
            contents,
            DataContents::Directory {
                directory: "/data/raw".to_string(),
                message: "Data is stored in Hadoop in /data/raw".to_string(),
                files: vec![],
            }
        );
    }

    #[tokio::test]
    async fn test_unresolved_asset() {
        let store = MemoryDocumentStore::new();
        let bridge = RecordingBridge::default();
        let asset = TestAsset::new("p").insert(&store).await;

        let err = handle(&store, &bridge, GetDataQuery { asset_id: asset.id.to_string() })
            .await
            .unwrap_err();
        assert!(matches!(err, GetDataError::Unresolved(_)));
    }
}
