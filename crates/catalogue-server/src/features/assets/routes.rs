//! Asset registry routes
//!
//! - `POST /cataloguing/asset` - Register an asset (embedded or by connector reference)
//! - `GET /cataloguing/asset` - List every asset
//! - `GET /cataloguing/asset/:id` - Get one asset, or `null`
//! - `DELETE /cataloguing/asset/:id` - Delete an asset
//! - `GET /cataloguing/asset/Pilot/:pilot_name` - Assets owned by a pilot

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use super::commands::{CreateAssetCommand, CreateAssetError, DeleteAssetCommand, DeleteAssetError};
use super::queries::{GetAssetQuery, ListAssetsQuery};
use crate::api::response::{ApiResponse, MessageResponse};
use crate::error::AppError;
use crate::features::FeatureState;

pub fn assets_routes() -> Router<FeatureState> {
    Router::new()
        .route("/asset", get(list_assets).post(create_asset))
        .route("/asset/:id", get(get_asset).delete(delete_asset))
        .route("/asset/Pilot/:pilot_name", get(list_pilot_assets))
}

/// Register an asset
///
/// Post-create hooks for the asset's connector run first; their derived
/// assets are listed in `meta.derived`.
///
/// - `200 OK` - The created record
/// - `400 Bad Request` - Missing field, unknown connector or hook failure
#[tracing::instrument(skip(state, payload))]
async fn create_asset(
    State(state): State<FeatureState>,
    Json(payload): Json<Value>,
) -> Result<Response, AppError> {
    let command = CreateAssetCommand::from_json(payload)?;
    let response =
        super::commands::create::handle(state.store.as_ref(), &state.hooks, command).await?;

    let derived: Vec<_> = response.derived.iter().map(|a| a.id).collect();
    let meta = json!({ "derived": derived });

    Ok(ApiResponse::success_with_meta(response.asset, meta).into_response())
}

#[tracing::instrument(skip(state))]
async fn list_assets(State(state): State<FeatureState>) -> Result<Response, AppError> {
    let assets =
        super::queries::list::handle(state.store.as_ref(), ListAssetsQuery::default()).await?;
    tracing::debug!(count = assets.len(), "Assets listed via API");
    Ok(ApiResponse::success(assets).into_response())
}

#[tracing::instrument(skip(state), fields(pilot = %pilot_name))]
async fn list_pilot_assets(
    State(state): State<FeatureState>,
    Path(pilot_name): Path<String>,
) -> Result<Response, AppError> {
    let query = ListAssetsQuery {
        pilot: Some(pilot_name),
    };
    let assets = super::queries::list::handle(state.store.as_ref(), query).await?;
    Ok(ApiResponse::success(assets).into_response())
}

#[tracing::instrument(skip(state), fields(id = %id))]
async fn get_asset(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let asset = super::queries::get::handle(state.store.as_ref(), GetAssetQuery { id }).await?;
    Ok(ApiResponse::success(asset).into_response())
}

/// Delete an asset
///
/// - `200 OK` - `Document with type '<type>' has been deleted`
/// - `400 Bad Request` - The id is malformed or unknown
#[tracing::instrument(skip(state), fields(id = %id))]
async fn delete_asset(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let response =
        super::commands::delete::handle(state.store.as_ref(), DeleteAssetCommand { id }).await?;
    Ok(ApiResponse::success(MessageResponse::new(response.message)).into_response())
}

impl From<CreateAssetError> for AppError {
    fn from(err: CreateAssetError) -> Self {
        match err {
            CreateAssetError::Malformed(_) | CreateAssetError::ConnectorNotFound(_) => {
                AppError::Validation(err.to_string())
            },
            CreateAssetError::Invalid(e) => e.into(),
            CreateAssetError::Hook(e) => e.into(),
            CreateAssetError::Store(e) => e.into(),
        }
    }
}

impl From<DeleteAssetError> for AppError {
    fn from(err: DeleteAssetError) -> Self {
        match err {
            DeleteAssetError::NotDeleted(_) => AppError::Validation(err.to_string()),
            DeleteAssetError::Store(e) => e.into(),
        }
    }
}
