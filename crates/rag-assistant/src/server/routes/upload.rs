//! PDF upload endpoint

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::response::UploadResponse;

/// Multipart field carrying the document
const FILE_FIELD: &str = "file";

/// POST /api/sessions/:id/upload - Store a PDF for later processing
pub async fn upload_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let session = state.sessions().get(&id)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::BadRequest("Upload is missing a filename".into()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::BadRequest(format!("Failed to read file: {}", e)))?;

        let response = state.shell().upload(&session, &filename, &data).await?;
        return Ok(Json(response));
    }

    Err(Error::BadRequest(format!(
        "Multipart body has no '{}' field",
        FILE_FIELD
    )))
}
