//! Folder listing and download handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tokio_util::io::ReaderStream;

use homeshare_core::error::AppError;
use homeshare_entity::folder::FileEntry;

use crate::error::ApiError;
use crate::extractors::AuthClaims;
use crate::state::AppState;

/// Path segment for the root folder, which cannot appear literally.
const ROOT_SEGMENT: &str = "root";

fn folder_from_path(segment: &str) -> &str {
    if segment == ROOT_SEGMENT { "/" } else { segment }
}

/// GET /api/folders/{folder_id}/files
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthClaims,
    Path(folder_id): Path<String>,
) -> Result<Json<Vec<FileEntry>>, ApiError> {
    let files = state
        .files
        .list_folder(&auth, folder_from_path(&folder_id))
        .await?;
    Ok(Json(files))
}

/// GET /api/folders/{folder_id}/files/{file_name}
pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthClaims,
    Path((folder_id, file_name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let handle = state
        .files
        .open_download(&auth, folder_from_path(&folder_id), &file_name)
        .await?;

    let response = Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", handle.file_name),
        )
        .header(header::CONTENT_LENGTH, handle.size)
        .body(Body::from_stream(ReaderStream::new(handle.file)))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// GET /api/folders/{folder_id}/files/{file_name}/available
pub async fn check_available(
    State(state): State<AppState>,
    auth: AuthClaims,
    Path((folder_id, file_name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .files
        .check_available(&auth, folder_from_path(&folder_id), &file_name)
        .await?;
    Ok(StatusCode::OK)
}
