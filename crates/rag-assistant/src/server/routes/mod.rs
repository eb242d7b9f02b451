//! API routes for the RAG assistant

pub mod chat;
pub mod process;
pub mod sessions;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/:id/messages", get(sessions::get_messages))
        // Larger body limit for PDF uploads
        .route(
            "/sessions/:id/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/sessions/:id/process", post(process::process_file))
        .route("/sessions/:id/chat", post(chat::chat))
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    Json(serde_json::json!({
        "name": "rag-assistant",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Upload a PDF, build a vector index, and chat with grounded answers",
        "embedding": {
            "provider": state.embedder().name(),
            "model": state.embedder().model(),
            "dimensions": state.embedder().dimensions(),
        },
        "llm": {
            "provider": state.llm().name(),
            "model": state.llm().model(),
            "temperature": config.llm.temperature,
        },
        "chunking": {
            "chunk_size": config.chunking.chunk_size,
            "chunk_overlap": config.chunking.chunk_overlap,
        },
        "retrieval": { "top_k": config.retrieval.top_k },
        "index_ready": state.is_ready(),
        "active_sessions": state.sessions().len(),
        "endpoints": {
            "POST /api/sessions": "Start a session",
            "GET /api/sessions/:id": "Session summary",
            "DELETE /api/sessions/:id": "End a session",
            "GET /api/sessions/:id/messages": "Transcript",
            "POST /api/sessions/:id/upload": "Upload a PDF (multipart field 'file')",
            "POST /api/sessions/:id/process": "Build the index from an uploaded PDF",
            "POST /api/sessions/:id/chat": "Ask a question"
        }
    }))
}
