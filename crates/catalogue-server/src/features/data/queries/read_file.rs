use crate::bridge::{remote_path, BridgeError, ByteStream, FilesystemBridge};
use crate::features::assets::find_asset;
use crate::features::shared::{validate_file_name, PathValidationError};
use crate::ingest::Destination;
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Clone)]
pub struct ReadFileQuery {
    pub asset_id: String,
    pub file_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReadFileError {
    #[error("Asset '{0}' not found")]
    AssetNotFound(String),
    #[error("Asset '{0}' has no directory configured")]
    NoDirectory(String),
    #[error(transparent)]
    InvalidName(#[from] PathValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Open one file of the asset's directory for streaming
#[tracing::instrument(skip(store, bridge))]
pub async fn handle(
    store: &dyn DocumentStore,
    bridge: &dyn FilesystemBridge,
    query: ReadFileQuery,
) -> Result<ByteStream, ReadFileError> {
    let asset = find_asset(store, &query.asset_id)
        .await?
        .ok_or_else(|| ReadFileError::AssetNotFound(query.asset_id.clone()))?;

    let Destination::FilesystemDirectory(directory) = Destination::resolve(&asset) else {
        return Err(ReadFileError::NoDirectory(query.asset_id));
    };
    validate_file_name(&query.file_name)?;

    let stream = bridge.get_file(&remote_path(&directory, &query.file_name)).await?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{RecordingBridge, TestAsset};
    use crate::store::MemoryDocumentStore;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_streams_copied_file() {
        let store = MemoryDocumentStore::new();
        let bridge = RecordingBridge::default();
        bridge
            .files
            .lock()
            .unwrap()
            .push(("/data/raw/a.json".to_string(), bytes::Bytes::from_static(b"{\"t\":1}")));
        let asset = TestAsset::new("p")
            .with_parameter("directory", "/data/raw")
            .insert(&store)
            .await;

        let stream = handle(
            &store,
            &bridge,
            ReadFileQuery {
                asset_id: asset.id.to_string(),
                file_name: "a.json".to_string(),
            },
        )
        .await
        .unwrap();
        let chunks: Vec<bytes::Bytes> = stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"{\"t\":1}");
    }

    #[tokio::test]
    async fn test_rejects_collection_assets_and_bad_names() {
        let store = MemoryDocumentStore::new();
        let bridge = RecordingBridge::default();
        let collection = TestAsset::new("p")
            .with_parameter("collection", "readings")
            .insert(&store)
            .await;
        let directory = TestAsset::new("p")
            .with_parameter("directory", "/data/raw")
            .insert(&store)
            .await;

        let err = handle(
            &store,
            &bridge,
            ReadFileQuery {
                asset_id: collection.id.to_string(),
                file_name: "a.json".to_string(),
            },
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ReadFileError::NoDirectory(_)));

        let err = handle(
            &store,
            &bridge,
            ReadFileQuery {
                asset_id: directory.id.to_string(),
                file_name: "..".to_string(),
            },
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ReadFileError::InvalidName(_)));
    }
}
