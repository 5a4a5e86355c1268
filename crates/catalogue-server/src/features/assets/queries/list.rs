use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{DocumentStore, StoreError, ASSETS_COLLECTION};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAssetsQuery {
    /// Only assets owned by this pilot
    pub pilot: Option<String>,
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn DocumentStore,
    query: ListAssetsQuery,
) -> Result<Vec<Value>, StoreError> {
    let documents = match query.pilot {
        Some(pilot) => store.find_by_field(ASSETS_COLLECTION, "pilot", &pilot).await?,
        None => store.find_all(ASSETS_COLLECTION).await?,
    };
    Ok(documents.into_iter().map(|d| d.into_json()).collect())
}
