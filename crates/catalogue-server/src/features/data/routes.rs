//! Data movement routes
//!
//! - `POST /data/upload/:asset_id` - Import `{values}` into the asset's destination
//! - `POST /file/upload/:asset_id/*file_path` - Stream a file from the import root into a collection
//! - `GET /data/get/:asset_id` - Collection contents, or the directory listing
//! - `GET /data/file/:asset_id/:file_name` - Stream one copied file back

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::commands::{
    ImportFileCommand, ImportFileError, UploadBody, UploadDataCommand, UploadDataError,
};
use super::queries::{GetDataError, GetDataQuery, ReadFileError, ReadFileQuery};
use crate::api::response::ApiResponse;
use crate::error::AppError;
use crate::features::FeatureState;

pub fn data_routes() -> Router<FeatureState> {
    Router::new()
        .route("/data/upload/:asset_id", post(upload_data))
        .route("/file/upload/:asset_id/*file_path", post(import_file))
        .route("/data/get/:asset_id", get(get_data))
        .route("/data/file/:asset_id/:file_name", get(read_file))
}

/// Import request values into the asset's destination
///
/// Directory destinations reply once every record is staged; the copies
/// finish in the background.
///
/// - `200 OK` - Confirmation with record and batch counts
/// - `400 Bad Request` - No destination, reserved collection or missing `values`
/// - `404 Not Found` - Unknown asset
#[tracing::instrument(skip(state, body), fields(asset_id = %asset_id))]
async fn upload_data(
    State(state): State<FeatureState>,
    Path(asset_id): Path<String>,
    Json(body): Json<UploadBody>,
) -> Result<Response, AppError> {
    let command = UploadDataCommand {
        asset_id,
        values: body.values,
    };
    let response =
        super::commands::upload::handle(state.store.as_ref(), &state.pipeline, command).await?;

    tracing::info!(
        destination = %response.destination,
        accepted = response.accepted,
        "Data upload accepted"
    );
    Ok(ApiResponse::success(response).into_response())
}

#[tracing::instrument(skip(state), fields(asset_id = %asset_id, file_path = %file_path))]
async fn import_file(
    State(state): State<FeatureState>,
    Path((asset_id, file_path)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let command = ImportFileCommand {
        asset_id,
        file_path,
    };
    let response = super::commands::import_file::handle(
        state.store.as_ref(),
        &state.pipeline,
        &state.import_root,
        command,
    )
    .await?;
    Ok(ApiResponse::success(response).into_response())
}

#[tracing::instrument(skip(state), fields(asset_id = %asset_id))]
async fn get_data(
    State(state): State<FeatureState>,
    Path(asset_id): Path<String>,
) -> Result<Response, AppError> {
    let contents = super::queries::get_data::handle(
        state.store.as_ref(),
        state.bridge.as_ref(),
        GetDataQuery { asset_id },
    )
    .await?;
    Ok(ApiResponse::success(contents).into_response())
}

#[tracing::instrument(skip(state), fields(asset_id = %asset_id, file_name = %file_name))]
async fn read_file(
    State(state): State<FeatureState>,
    Path((asset_id, file_name)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let stream = super::queries::read_file::handle(
        state.store.as_ref(),
        state.bridge.as_ref(),
        ReadFileQuery {
            asset_id,
            file_name,
        },
    )
    .await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Body::from_stream(stream),
    )
        .into_response())
}

impl From<UploadDataError> for AppError {
    fn from(err: UploadDataError) -> Self {
        match err {
            UploadDataError::AssetNotFound(_) => AppError::NotFound(err.to_string()),
            UploadDataError::MissingValues => AppError::Validation(err.to_string()),
            UploadDataError::Import(e) => e.into(),
            UploadDataError::Store(e) => e.into(),
        }
    }
}

impl From<ImportFileError> for AppError {
    fn from(err: ImportFileError) -> Self {
        match err {
            ImportFileError::AssetNotFound(_) | ImportFileError::FileNotFound(_) => {
                AppError::NotFound(err.to_string())
            },
            ImportFileError::NoCollection(_) | ImportFileError::InvalidPath(_) => {
                AppError::Validation(err.to_string())
            },
            ImportFileError::Open { .. } => AppError::Storage(err.to_string()),
            ImportFileError::Import(e) => e.into(),
            ImportFileError::Store(e) => e.into(),
        }
    }
}

impl From<GetDataError> for AppError {
    fn from(err: GetDataError) -> Self {
        match err {
            GetDataError::AssetNotFound(_) => AppError::NotFound(err.to_string()),
            GetDataError::Unresolved(_) => AppError::Validation(err.to_string()),
            GetDataError::Store(e) => e.into(),
            GetDataError::Bridge(e) => e.into(),
        }
    }
}

impl From<ReadFileError> for AppError {
    fn from(err: ReadFileError) -> Self {
        match err {
            ReadFileError::AssetNotFound(_) => AppError::NotFound(err.to_string()),
            ReadFileError::NoDirectory(_) | ReadFileError::InvalidName(_) => {
                AppError::Validation(err.to_string())
            },
            ReadFileError::Store(e) => e.into(),
            ReadFileError::Bridge(e) => e.into(),
        }
    }
}
