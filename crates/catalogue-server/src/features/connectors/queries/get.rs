use serde_json::Value;

use crate::features::shared::parse_record_id;
use crate::store::{DocumentStore, StoreError, CONNECTORS_COLLECTION};

#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn DocumentStore, id: &str) -> Result<Option<Value>, StoreError> {
    let Some(id) = parse_record_id(id) else {
        return Ok(None);
    };
    let document = store.find_by_id(CONNECTORS_COLLECTION, id).await?;
    Ok(document.map(|d| d.into_json()))
}
