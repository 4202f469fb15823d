//! Chunked upload handler.

use axum::Json;
use axum::extract::{Multipart, State};
use bytes::Bytes;

use homeshare_core::error::AppError;
use homeshare_service::upload::ChunkSubmission;

use crate::dto::response::ChunkAcceptedResponse;
use crate::error::ApiError;
use crate::extractors::AuthClaims;
use crate::state::AppState;

#[derive(Default)]
struct ChunkForm {
    transfer_id: Option<String>,
    folder_id: Option<String>,
    file_name: Option<String>,
    file_extension: Option<String>,
    file_hash: Option<String>,
    chunk_index: Option<i64>,
    total_chunks: Option<i64>,
    chunk: Option<Bytes>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::validation(format!("{field} is required")))
}

fn parse_number(text: &str, field: &str) -> Result<i64, AppError> {
    text.trim()
        .parse()
        .map_err(|_| AppError::validation(format!("{field} must be an integer")))
}

/// POST /api/uploads
pub async fn upload_chunk(
    State(state): State<AppState>,
    auth: AuthClaims,
    mut multipart: Multipart,
) -> Result<Json<ChunkAcceptedResponse>, ApiError> {
    let mut form = ChunkForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "chunk" {
            form.chunk = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
            );
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
        match name.as_str() {
            "transfer_id" => form.transfer_id = Some(text),
            "folder_id" => form.folder_id = Some(text),
            "file_name" => form.file_name = Some(text),
            "file_extension" => form.file_extension = Some(text),
            "file_hash" => form.file_hash = Some(text),
            "chunk_index" => form.chunk_index = Some(parse_number(&text, "chunk_index")?),
            "total_chunks" => form.total_chunks = Some(parse_number(&text, "total_chunks")?),
            _ => {}
        }
    }

    let submission = ChunkSubmission {
        transfer_id: required(form.transfer_id, "transfer_id")?,
        folder_id: form.folder_id.unwrap_or_else(|| "/".to_string()),
        file_name: required(form.file_name, "file_name")?,
        file_extension: required(form.file_extension, "file_extension")?,
        declared_hash: required(form.file_hash, "file_hash")?,
        chunk_index: required(form.chunk_index, "chunk_index")?,
        total_chunks: required(form.total_chunks, "total_chunks")?,
        data: required(form.chunk, "chunk")?,
    };

    let receipt = state.uploads.submit_chunk(&auth, submission).await?;

    Ok(Json(ChunkAcceptedResponse {
        received_chunks: receipt.received_chunks,
        total_chunks: receipt.total_chunks,
        assembling: receipt.assembly_started,
    }))
}
