//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::bridge::BridgeError;
use crate::hooks::HookError;
use crate::ingest::{DecodeError, ImportError};
use crate::store::StoreError;
use catalogue_common::CatalogueError;

/// Result type alias for request handling
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application error types
///
/// Messages are returned to clients verbatim.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Unavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Unavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Storage(message) => tracing::error!("Storage error: {}", message),
            AppError::Unavailable(message) => tracing::warn!("Service unavailable: {}", message),
            _ => tracing::debug!(status = status.as_u16(), "Request rejected: {}", self),
        }

        let body = ErrorResponse::new(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<BridgeError> for AppError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::NotFound(_) => AppError::NotFound(err.to_string()),
            _ => AppError::Storage(err.to_string()),
        }
    }
}

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Unresolved | ImportError::ReservedCollection(_) => {
                AppError::Validation(err.to_string())
            },
            ImportError::Store(e) => e.into(),
            ImportError::Decode(e) => e.into(),
            ImportError::Staging(_) => AppError::Storage(err.to_string()),
        }
    }
}

impl From<HookError> for AppError {
    fn from(err: HookError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<CatalogueError> for AppError {
    fn from(err: CatalogueError) -> Self {
        match err {
            CatalogueError::MissingField(_) => AppError::Validation(err.to_string()),
            CatalogueError::Serialization(_) => AppError::Storage(err.to_string()),
        }
    }
}
