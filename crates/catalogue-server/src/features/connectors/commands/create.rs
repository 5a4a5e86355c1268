use catalogue_common::types::{Connector, ConnectorDraft};
use catalogue_common::CatalogueError;

use crate::store::{insert_one, DocumentStore, StoreError, CONNECTORS_COLLECTION};

pub type CreateConnectorCommand = ConnectorDraft;

#[derive(Debug, thiserror::Error)]
pub enum CreateConnectorError {
    #[error(transparent)]
    Invalid(#[from] CatalogueError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store, command), fields(name = %command.name))]
pub async fn handle(
    store: &dyn DocumentStore,
    command: CreateConnectorCommand,
) -> Result<Connector, CreateConnectorError> {
    command.validate()?;

    let body = serde_json::to_value(&command).map_err(CatalogueError::from)?;
    let id = insert_one(store, CONNECTORS_COLLECTION, body).await?;

    tracing::info!(connector_id = %id, name = %command.name, "Connector registered");
    Ok(Connector::from_draft(id, command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use catalogue_common::types::Parameter;

    #[tokio::test]
    async fn test_create_connector() {
        let store = MemoryDocumentStore::new();
        let connector = handle(
            &store,
            ConnectorDraft {
                name: "mongodb".to_string(),
                protocol: "mongodb".to_string(),
                parameters: vec![Parameter::new("database", "plant")],
            },
        )
        .await
        .unwrap();

        let stored = store
            .find_by_id(CONNECTORS_COLLECTION, connector.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.body["parameters"][0]["value"], "plant");
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let store = MemoryDocumentStore::new();
        let err = handle(&store, ConnectorDraft::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: name");
    }
}
