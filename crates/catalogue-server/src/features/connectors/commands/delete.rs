use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::features::shared::parse_record_id;
use crate::store::{DocumentStore, StoreError, CONNECTORS_COLLECTION};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteConnectorCommand {
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteConnectorError {
    #[error("Connector id '{0}' is invalid or does not exist")]
    NotDeleted(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Delete a connector; assets that embedded it keep their copy
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn DocumentStore,
    command: DeleteConnectorCommand,
) -> Result<String, DeleteConnectorError> {
    let id = parse_record_id(&command.id)
        .ok_or_else(|| DeleteConnectorError::NotDeleted(command.id.clone()))?;

    let deleted = store
        .delete_by_id(CONNECTORS_COLLECTION, id)
        .await?
        .ok_or_else(|| DeleteConnectorError::NotDeleted(command.id.clone()))?;

    let name = deleted.body.get("name").and_then(Value::as_str).unwrap_or("unknown");
    tracing::info!(connector_id = %id, name, "Connector deleted");

    Ok(format!("Connector '{}' has been deleted", name))
}
