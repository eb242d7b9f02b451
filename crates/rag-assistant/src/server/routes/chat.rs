//! Chat endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::response::{ChatRequest, ChatResponse};

/// POST /api/sessions/:id/chat - Ask a question about the indexed document
pub async fn chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let session = state.sessions().get(&id)?;
    let response = state.shell().ask(&session, &request.message).await?;
    Ok(Json(response))
}
