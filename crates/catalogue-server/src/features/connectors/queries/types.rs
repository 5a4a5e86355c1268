use crate::store::{DocumentStore, StoreError, CONNECTORS_COLLECTION};

/// Distinct connector names, sorted
#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn DocumentStore) -> Result<Vec<String>, StoreError> {
    store.distinct(CONNECTORS_COLLECTION, "name").await
}
