use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::features::assets::find_asset;
use crate::ingest::{Destination, ImportError, ImportOutcome, ImportPipeline, RecordSource};
use crate::store::{DocumentStore, StoreError};

/// Request body of `POST /data/upload/:asset_id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadBody {
    /// One record or an array of records
    #[serde(default)]
    pub values: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct UploadDataCommand {
    pub asset_id: String,
    pub values: Option<Value>,
}

/// Confirmation returned by both upload routes
#[derive(Debug, Clone, Serialize)]
pub struct DataImportResponse {
    pub message: String,
    pub destination: Destination,
    /// Records written, or staged for copy
    pub accepted: usize,
    pub batches: usize,
}

impl DataImportResponse {
    /// Build the confirmation, detaching any copies still in flight
    pub(crate) fn from_outcome(
        mut outcome: ImportOutcome,
        pipeline: &ImportPipeline,
    ) -> Result<Self, ImportError> {
        let message = match &outcome.destination {
            Destination::Collection(name) => format!("Data imported into collection {}", name),
            Destination::FilesystemDirectory(dir) => {
                if let Some(transfers) = outcome.transfers.take() {
                    pipeline.detach(transfers, dir);
                }
                format!("Data should be imported to Hadoop in {}", dir)
            },
            Destination::Unresolved => return Err(ImportError::Unresolved),
        };

        Ok(Self {
            message,
            destination: outcome.destination,
            accepted: outcome.accepted,
            batches: outcome.batches,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadDataError {
    #[error("Asset '{0}' not found")]
    AssetNotFound(String),
    #[error("Missing required field: values")]
    MissingValues,
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store, pipeline, command), fields(asset_id = %command.asset_id))]
pub async fn handle(
    store: &dyn DocumentStore,
    pipeline: &ImportPipeline,
    command: UploadDataCommand,
) -> Result<DataImportResponse, UploadDataError> {
    let asset = find_asset(store, &command.asset_id)
        .await?
        .ok_or_else(|| UploadDataError::AssetNotFound(command.asset_id.clone()))?;
    let values = command.values.ok_or(UploadDataError::MissingValues)?;

    let destination = Destination::resolve(&asset);
    let outcome = pipeline
        .import_records(&destination, RecordSource::from_payload(values))
        .await?;

    Ok(DataImportResponse::from_outcome(outcome, pipeline)?)
}
