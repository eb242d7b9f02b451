//! rag-assistant: question answering over a single uploaded PDF
//!
//! A PDF is split into overlapping character windows, embedded through an
//! Ollama model, and stored as a flat vector index on disk. Questions are
//! embedded the same way, the closest chunks become the context of a Groq chat
//! completion, and the answer is recorded in a per-session transcript.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::{Answer, AnsweringPipeline, DATABASE_NOT_FOUND};
pub use ingestion::{IngestPipeline, PdfLoader, TextChunker};
pub use retrieval::{IndexStore, LoadOutcome, VectorIndex};
pub use session::{Session, SessionManager, SessionShell};
pub use types::{
    document::{Chunk, ChunkSource, FileType, LoadedDocument, PageText},
    response::{IngestReport, SourceRef},
    transcript::{ChatMessage, Role, Transcript},
};
