//! Request and response types for the HTTP API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::Chunk;
use super::transcript::ChatMessage;

/// A retrieved chunk as shown alongside an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source filename
    pub filename: String,
    /// Page number (1-indexed, for display)
    pub page_number: u32,
    /// Chunk text handed to the LLM
    pub snippet: String,
    /// Cosine similarity to the question
    pub similarity_score: f32,
}

impl SourceRef {
    /// Create a source reference from a chunk and similarity score
    pub fn from_chunk(chunk: &Chunk, similarity_score: f32) -> Self {
        Self {
            filename: chunk.source.filename.clone(),
            page_number: chunk.source.page + 1,
            snippet: chunk.content.clone(),
            similarity_score,
        }
    }
}

/// Summary of one index build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Document the index was built from
    pub filename: String,
    /// Pages extracted by the loader
    pub pages: u32,
    /// Chunks embedded and indexed
    pub chunks: usize,
    /// Where the index was written
    pub index_dir: String,
    /// Wall time in milliseconds
    pub processing_time_ms: u64,
}

/// POST /api/sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreateResponse {
    pub session_id: Uuid,
}

/// GET /api/sessions/:id/messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub session_id: Uuid,
    pub messages: Vec<ChatMessage>,
}

/// POST /api/sessions/:id/upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Name the file was stored under
    pub filename: String,
    /// Bytes written
    pub size_bytes: u64,
    /// SHA-256 of the uploaded bytes
    pub content_hash: String,
    /// "Uploaded: <filename>"
    pub message: String,
}

/// POST /api/sessions/:id/process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    /// A previously uploaded filename
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub message: String,
    pub report: IngestReport,
}

/// POST /api/sessions/:id/chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply (also the last transcript entry)
    pub answer: String,
    /// Chunks the answer was grounded on; empty when no index exists
    pub sources: Vec<SourceRef>,
    /// Full transcript after this turn
    pub messages: Vec<ChatMessage>,
}
