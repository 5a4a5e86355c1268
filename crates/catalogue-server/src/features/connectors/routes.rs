//! Connector registry routes
//!
//! - `POST /cataloguing/connector` - Register a connector
//! - `GET /cataloguing/connector` - List connectors
//! - `GET /cataloguing/connector/:id` - Get one connector, or `null`
//! - `DELETE /cataloguing/connector/:id` - Delete a connector
//! - `GET /cataloguing/connectorTypes` - Distinct connector names

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::commands::{
    CreateConnectorCommand, CreateConnectorError, DeleteConnectorCommand, DeleteConnectorError,
};
use crate::api::response::{ApiResponse, MessageResponse};
use crate::error::AppError;
use crate::features::FeatureState;

pub fn connectors_routes() -> Router<FeatureState> {
    Router::new()
        .route("/connector", get(list_connectors).post(create_connector))
        .route("/connector/:id", get(get_connector).delete(delete_connector))
        .route("/connectorTypes", get(connector_types))
}

#[tracing::instrument(skip(state, command), fields(name = %command.name))]
async fn create_connector(
    State(state): State<FeatureState>,
    Json(command): Json<CreateConnectorCommand>,
) -> Result<Response, AppError> {
    let connector = super::commands::create::handle(state.store.as_ref(), command).await?;
    Ok(ApiResponse::success(connector).into_response())
}

#[tracing::instrument(skip(state))]
async fn list_connectors(State(state): State<FeatureState>) -> Result<Response, AppError> {
    let connectors = super::queries::list::handle(state.store.as_ref()).await?;
    Ok(ApiResponse::success(connectors).into_response())
}

#[tracing::instrument(skip(state), fields(id = %id))]
async fn get_connector(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let connector = super::queries::get::handle(state.store.as_ref(), &id).await?;
    Ok(ApiResponse::success(connector).into_response())
}

#[tracing::instrument(skip(state), fields(id = %id))]
async fn delete_connector(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let message =
        super::commands::delete::handle(state.store.as_ref(), DeleteConnectorCommand { id })
            .await?;
    Ok(ApiResponse::success(MessageResponse::new(message)).into_response())
}

#[tracing::instrument(skip(state))]
async fn connector_types(State(state): State<FeatureState>) -> Result<Response, AppError> {
    let names = super::queries::types::handle(state.store.as_ref()).await?;
    Ok(ApiResponse::success(names).into_response())
}

impl From<CreateConnectorError> for AppError {
    fn from(err: CreateConnectorError) -> Self {
        match err {
            CreateConnectorError::Invalid(e) => e.into(),
            CreateConnectorError::Store(e) => e.into(),
        }
    }
}

impl From<DeleteConnectorError> for AppError {
    fn from(err: DeleteConnectorError) -> Self {
        match err {
            DeleteConnectorError::NotDeleted(_) => AppError::Validation(err.to_string()),
            DeleteConnectorError::Store(e) => e.into(),
        }
    }
}
