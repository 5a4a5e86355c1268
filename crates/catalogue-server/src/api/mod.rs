//! Router assembly
//!
//! Feature routes live under `/api`; `/health` sits at the root.

pub mod response;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;

use crate::bridge::SharedBridge;
use crate::config::Config;
use crate::error::AppError;
use crate::features::{self, FeatureState};
use crate::hooks::HookRegistry;
use crate::ingest::{ImportConfig, ImportPipeline};
use crate::middleware;
use crate::store::SharedStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub bridge: SharedBridge,
    pub hooks: Arc<HookRegistry>,
    pub pipeline: Arc<ImportPipeline>,
    pub import_root: PathBuf,
}

impl AppState {
    pub fn new(
        store: SharedStore,
        bridge: SharedBridge,
        hooks: HookRegistry,
        import: &ImportConfig,
    ) -> Self {
        let pipeline = ImportPipeline::new(store.clone(), bridge.clone(), import);
        Self {
            store,
            bridge,
            hooks: Arc::new(hooks),
            pipeline: Arc::new(pipeline),
            import_root: import.import_root.clone(),
        }
    }

    fn features(&self) -> FeatureState {
        FeatureState {
            store: self.store.clone(),
            bridge: self.bridge.clone(),
            hooks: self.hooks.clone(),
            pipeline: self.pipeline.clone(),
            import_root: self.import_root.clone(),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, config: &Config) -> Router {
    let feature_routes = features::router(state.features());

    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
        .nest("/api", feature_routes)
        // Outermost first
        .layer(
            ServiceBuilder::new()
                .layer(CompressionLayer::new())
                .layer(middleware::tracing_layer())
                .layer(middleware::cors_layer(&config.cors)),
        )
}

/// Health check: round trip to the document store
async fn health_check(State(state): State<AppState>) -> Result<Response, AppError> {
    match state.store.ping().await {
        Ok(()) => Ok(Json(json!({
            "status": "healthy",
            "store": "connected"
        }))
        .into_response()),
        Err(e) => {
            tracing::error!("Store health check failed: {}", e);
            Err(AppError::Unavailable(format!("Document store unreachable: {}", e)))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::RecordingBridge;
    use crate::hooks::HookConfig;
    use crate::store::MemoryDocumentStore;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn router(work_dir: &std::path::Path) -> Router {
        let state = AppState::new(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(RecordingBridge::default()),
            HookRegistry::with_defaults(&HookConfig::default()),
            &ImportConfig::new().with_staging_dir(work_dir.join("staging")),
        );
        create_router(state, &Config::default())
    }

    #[tokio::test]
    async fn test_layers_wrap_every_route() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .uri("/api/cataloguing/asset")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap();

        let response = router(dir.path()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn test_health_reports_store() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = router(dir.path()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
