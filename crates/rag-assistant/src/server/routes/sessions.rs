//! Session lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::response::{SessionCreateResponse, TranscriptResponse};

/// Session summary
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub message_count: usize,
    pub index_ready: bool,
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionCreateResponse>) {
    let session = state.sessions().create();
    tracing::info!("New session {}", session.id());
    (
        StatusCode::CREATED,
        Json(SessionCreateResponse {
            session_id: session.id(),
        }),
    )
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>> {
    let session = state.sessions().get(&id)?;
    Ok(Json(SessionSummary {
        session_id: session.id(),
        created_at: session.created_at(),
        message_count: session.transcript_len(),
        index_ready: state.is_ready(),
    }))
}

/// GET /api/sessions/:id/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>> {
    let session = state.sessions().get(&id)?;
    Ok(Json(TranscriptResponse {
        session_id: id,
        messages: session.messages(),
    }))
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if state.sessions().remove(&id) {
        tracing::info!("Ended session {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::SessionNotFound(id.to_string()))
    }
}
