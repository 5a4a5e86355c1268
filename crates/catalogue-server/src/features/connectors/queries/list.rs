use serde_json::Value;

use crate::store::{DocumentStore, StoreError, CONNECTORS_COLLECTION};

#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn DocumentStore) -> Result<Vec<Value>, StoreError> {
    let documents = store.find_all(CONNECTORS_COLLECTION).await?;
    Ok(documents.into_iter().map(|d| d.into_json()).collect())
}
