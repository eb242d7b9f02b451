//! Error types for the RAG assistant

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG assistant errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document could not be loaded (unreadable or not a valid PDF)
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Embedding provider error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Index serialization or replacement error
    #[error("Index store error: {0}")]
    IndexStore(String),

    /// Unknown session
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Process requested for a file that was never uploaded
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Malformed request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an index store error
    pub fn index_store(message: impl Into<String>) -> Self {
        Self::IndexStore(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Config(_) => (StatusCode::BAD_REQUEST, "config_error"),
            Error::FileParse { .. } => (StatusCode::BAD_REQUEST, "parse_error"),
            Error::UnsupportedFileType(_) => (StatusCode::BAD_REQUEST, "unsupported_type"),
            Error::Embedding(_) => (StatusCode::BAD_GATEWAY, "embedding_error"),
            Error::Llm(_) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error"),
            Error::IndexStore(_) => (StatusCode::INTERNAL_SERVER_ERROR, "index_error"),
            Error::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            Error::DocumentNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.kind();

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
