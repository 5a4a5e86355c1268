use serde::{Deserialize, Serialize};
use serde_json::Value;

use catalogue_common::types::{Asset, AssetDraft};

use crate::features::shared::parse_record_id;
use crate::store::{DocumentStore, StoreError, ASSETS_COLLECTION};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAssetQuery {
    pub id: String,
}

/// The stored asset document, or `None` when the id is unknown or malformed
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn DocumentStore,
    query: GetAssetQuery,
) -> Result<Option<Value>, StoreError> {
    let Some(id) = parse_record_id(&query.id) else {
        return Ok(None);
    };
    let document = store.find_by_id(ASSETS_COLLECTION, id).await?;
    Ok(document.map(|d| d.into_json()))
}

/// Load a typed asset for data operations
///
/// Malformed ids are reported the same way as unknown ones.
pub async fn find_asset(
    store: &dyn DocumentStore,
    raw_id: &str,
) -> Result<Option<Asset>, StoreError> {
    let Some(id) = parse_record_id(raw_id) else {
        return Ok(None);
    };
    match store.find_by_id(ASSETS_COLLECTION, id).await? {
        Some(document) => {
            let draft: AssetDraft = document.decode(ASSETS_COLLECTION)?;
            Ok(Some(Asset::from_draft(id, draft)))
        },
        None => Ok(None),
    }
}
