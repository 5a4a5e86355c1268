use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::features::shared::parse_record_id;
use crate::store::{DocumentStore, StoreError, ASSETS_COLLECTION};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAssetCommand {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAssetResponse {
    pub id: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteAssetError {
    #[error("Asset id '{0}' is invalid or does not exist")]
    NotDeleted(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn DocumentStore,
    command: DeleteAssetCommand,
) -> Result<DeleteAssetResponse, DeleteAssetError> {
    let id = parse_record_id(&command.id)
        .ok_or_else(|| DeleteAssetError::NotDeleted(command.id.clone()))?;

    let deleted = store
        .delete_by_id(ASSETS_COLLECTION, id)
        .await?
        .ok_or_else(|| DeleteAssetError::NotDeleted(command.id.clone()))?;

    let kind = deleted
        .body
        .pointer("/model/type")
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    tracing::info!(asset_id = %id, kind, "Asset deleted");

    Ok(DeleteAssetResponse {
        message: format!("Document with type '{}' has been deleted", kind),
        id: command.id,
    })
}
