use std::io;
use std::path::Path;

use super::upload::DataImportResponse;
use crate::features::assets::find_asset;
use crate::features::shared::{resolve_import_path, PathValidationError};
use crate::ingest::{Destination, ImportError, ImportPipeline};
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Clone)]
pub struct ImportFileCommand {
    pub asset_id: String,
    /// Path relative to the import root
    pub file_path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportFileError {
    #[error("Asset '{0}' not found")]
    AssetNotFound(String),
    #[error("Asset '{0}' has no collection configured")]
    NoCollection(String),
    #[error(transparent)]
    InvalidPath(#[from] PathValidationError),
    #[error("File '{0}' not found")]
    FileNotFound(String),
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Stream a JSON file from the import root into the asset's collection
///
/// The reply is sent once the whole file has been decoded and flushed.
#[tracing::instrument(skip(store, pipeline, import_root), fields(asset_id = %command.asset_id))]
pub async fn handle(
    store: &dyn DocumentStore,
    pipeline: &ImportPipeline,
    import_root: &Path,
    command: ImportFileCommand,
) -> Result<DataImportResponse, ImportFileError> {
    let asset = find_asset(store, &command.asset_id)
        .await?
        .ok_or_else(|| ImportFileError::AssetNotFound(command.asset_id.clone()))?;

    let destination = Destination::resolve(&asset);
    if !matches!(destination, Destination::Collection(_)) {
        return Err(ImportFileError::NoCollection(command.asset_id));
    }

    let path = resolve_import_path(import_root, &command.file_path)?;
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file.into_std().await,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ImportFileError::FileNotFound(command.file_path));
        },
        Err(source) => {
            return Err(ImportFileError::Open {
                path: command.file_path,
                source,
            });
        },
    };

    tracing::info!(path = %path.display(), "Importing file");
    let outcome = pipeline
        .import_records(&destination, pipeline.stream_from(file))
        .await?;

    Ok(DataImportResponse::from_outcome(outcome, pipeline)?)
}
