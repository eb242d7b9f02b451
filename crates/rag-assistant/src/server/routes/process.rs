//! Index build endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::server::state::AppState;
use crate::session::INDEX_BUILT_MESSAGE;
use crate::types::response::{ProcessRequest, ProcessResponse};

/// POST /api/sessions/:id/process - Build the index from an uploaded PDF
pub async fn process_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>> {
    let session = state.sessions().get(&id)?;
    let report = state.shell().process(&session, &request.filename).await?;

    Ok(Json(ProcessResponse {
        message: INDEX_BUILT_MESSAGE.to_string(),
        report,
    }))
}
