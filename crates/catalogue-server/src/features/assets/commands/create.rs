use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use catalogue_common::types::{Asset, AssetDraft, AssetReference, Connector, ConnectorDraft};
use catalogue_common::CatalogueError;

use crate::features::shared::parse_record_id;
use crate::hooks::{HookError, HookRegistry};
use crate::store::{DocumentStore, StoreError, ASSETS_COLLECTION, CONNECTORS_COLLECTION};

/// Asset registration, either with an embedded interface or by connector reference
#[derive(Debug, Clone, PartialEq)]
pub enum CreateAssetCommand {
    Embedded(AssetDraft),
    ByReference(AssetReference),
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAssetResponse {
    pub asset: Asset,
    /// Assets derived by post-create hooks, stored alongside
    pub derived: Vec<Asset>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateAssetError {
    #[error("Malformed asset: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] CatalogueError),
    #[error("Connector with id '{0}' does not exist")]
    ConnectorNotFound(String),
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CreateAssetCommand {
    /// Pick the registration shape from the payload keys
    pub fn from_json(payload: Value) -> Result<Self, CreateAssetError> {
        let by_reference = payload
            .as_object()
            .is_some_and(|map| map.contains_key(AssetReference::CONNECTOR_ID_FIELD));

        if by_reference {
            serde_json::from_value(payload)
                .map(Self::ByReference)
                .map_err(CreateAssetError::Malformed)
        } else {
            serde_json::from_value(payload)
                .map(Self::Embedded)
                .map_err(CreateAssetError::Malformed)
        }
    }
}

#[tracing::instrument(skip(store, hooks, command))]
pub async fn handle(
    store: &dyn DocumentStore,
    hooks: &HookRegistry,
    command: CreateAssetCommand,
) -> Result<CreateAssetResponse, CreateAssetError> {
    let draft = match command {
        CreateAssetCommand::Embedded(draft) => draft,
        CreateAssetCommand::ByReference(reference) => {
            let connector = load_connector(store, &reference.connector_id).await?;
            reference.into_draft(&connector)
        },
    };
    draft.validate()?;

    // Hooks run before anything is written, so a failing hook stores nothing
    let derived = hooks.derive_all(&draft)?;
    for extra in &derived {
        extra.validate()?;
    }

    let mut drafts = Vec::with_capacity(1 + derived.len());
    drafts.push(draft);
    drafts.extend(derived);

    let bodies = drafts
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(CatalogueError::from)?;
    let ids = store.insert_many(ASSETS_COLLECTION, bodies).await?;
    if ids.len() != drafts.len() {
        return Err(StoreError::MissingId.into());
    }

    let mut assets = ids
        .into_iter()
        .zip(drafts)
        .map(|(id, draft)| Asset::from_draft(id, draft));
    let asset = assets.next().ok_or(StoreError::MissingId)?;
    let derived: Vec<Asset> = assets.collect();

    tracing::info!(
        asset_id = %asset.id,
        connector = %asset.interface.connector,
        derived = derived.len(),
        "Asset registered"
    );

    Ok(CreateAssetResponse { asset, derived })
}

async fn load_connector(
    store: &dyn DocumentStore,
    raw_id: &str,
) -> Result<Connector, CreateAssetError> {
    let not_found = || CreateAssetError::ConnectorNotFound(raw_id.to_string());
    let id: Uuid = parse_record_id(raw_id).ok_or_else(not_found)?;

    let document = store
        .find_by_id(CONNECTORS_COLLECTION, id)
        .await?
        .ok_or_else(not_found)?;
    let draft: ConnectorDraft = document.decode(CONNECTORS_COLLECTION)?;
    Ok(Connector::from_draft(id, draft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestAsset;
    use crate::hooks::HookConfig;
    use crate::store::{insert_one, MemoryDocumentStore};
    use serde_json::json;

    fn hooks() -> HookRegistry {
        HookRegistry::with_defaults(&HookConfig::default())
    }

    #[test]
    fn test_from_json_detects_reference() {
        let command = CreateAssetCommand::from_json(json!({
            "type": "t", "description": "d", "format": "f", "pilot": "p",
            "connector_type": "mongodb", "connector_id": "abc"
        }))
        .unwrap();
        assert!(matches!(command, CreateAssetCommand::ByReference(_)));

        let command =
            CreateAssetCommand::from_json(serde_json::to_value(TestAsset::new("p").draft()).unwrap())
                .unwrap();
        assert!(matches!(command, CreateAssetCommand::Embedded(_)));
    }

    #[tokio::test]
    async fn test_missing_field_stores_nothing() {
        let store = MemoryDocumentStore::new();
        let mut draft = TestAsset::new("p").draft();
        draft.model.format = String::new();

        let err = handle(&store, &hooks(), CreateAssetCommand::Embedded(draft))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: model.format");
        assert!(store.find_all(ASSETS_COLLECTION).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_kafka_hook_failure_stores_nothing() {
        let store = MemoryDocumentStore::new();
        let draft = TestAsset::new("p")
            .with_connector("Kafka")
            .with_parameter("bootstrap", "broker:9092")
            .draft();

        let err = handle(&store, &hooks(), CreateAssetCommand::Embedded(draft))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateAssetError::Hook(HookError::MissingParameter { .. })));
        assert!(store.find_all(ASSETS_COLLECTION).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_kafka_hook_derives_historical_asset() {
        let store = MemoryDocumentStore::new();
        let draft = TestAsset::new("p")
            .with_connector("kafka")
            .with_parameter("bootstrap", "broker:9092")
            .with_parameter("group", "catalogue")
            .with_parameter("topic", "line-3")
            .draft();

        let response = handle(&store, &hooks(), CreateAssetCommand::Embedded(draft))
            .await
            .unwrap();

        assert_eq!(response.derived.len(), 1);
        assert_eq!(response.derived[0].parameter("collection"), Some("historical_line-3"));
        assert_eq!(store.find_all(ASSETS_COLLECTION).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reference_embeds_stored_connector() {
        let store = MemoryDocumentStore::new();
        let connector_id = insert_one(
            &store,
            CONNECTORS_COLLECTION,
            json!({
                "name": "mongodb",
                "protocol": "mongodb",
                "parameters": [{"name": "collection", "value": "sensors"}]
            }),
        )
        .await
        .unwrap();

        let command = CreateAssetCommand::from_json(json!({
            "type": "timeseries", "description": "d", "format": "json", "pilot": "p",
            "connector_type": "mongodb", "connector_id": connector_id.to_string()
        }))
        .unwrap();
        let response = handle(&store, &hooks(), command).await.unwrap();

        assert_eq!(response.asset.interface.connector, "mongodb");
        assert_eq!(response.asset.parameter("collection"), Some("sensors"));
    }

    #[tokio::test]
    async fn test_unknown_connector_reference() {
        let store = MemoryDocumentStore::new();
        let command = CreateAssetCommand::from_json(json!({
            "type": "t", "description": "d", "format": "f", "pilot": "p",
            "connector_id": Uuid::new_v4().to_string()
        }))
        .unwrap();

        let err = handle(&store, &hooks(), command).await.unwrap_err();
        assert!(matches!(err, CreateAssetError::ConnectorNotFound(_)));
    }
}
