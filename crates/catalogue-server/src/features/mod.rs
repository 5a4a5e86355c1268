//! Feature slices of the catalogue API
//!
//! - **assets**: asset registry, post-create hooks
//! - **connectors**: connector registry
//! - **data**: uploads, file imports and reads through an asset's destination
//!
//! Each slice keeps write operations in `commands/`, reads in `queries/` and
//! the HTTP wiring in `routes.rs`.

pub mod assets;
pub mod connectors;
pub mod data;
pub mod shared;

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;

use crate::bridge::SharedBridge;
use crate::hooks::HookRegistry;
use crate::ingest::ImportPipeline;
use crate::store::SharedStore;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub store: SharedStore,
    pub bridge: SharedBridge,
    pub hooks: Arc<HookRegistry>,
    pub pipeline: Arc<ImportPipeline>,
    /// Root under which `/file/upload` paths are resolved
    pub import_root: PathBuf,
}

/// All feature routes, to be nested under `/api`
pub fn router(state: FeatureState) -> Router<()> {
    let cataloguing = assets::assets_routes().merge(connectors::connectors_routes());

    Router::new()
        .nest("/cataloguing", cataloguing)
        .merge(data::data_routes())
        .with_state(state)
}
