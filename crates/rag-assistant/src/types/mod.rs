//! Core types for the RAG assistant

pub mod document;
pub mod response;
pub mod transcript;

pub use document::{Chunk, ChunkSource, FileType, LoadedDocument, PageText};
pub use response::{IngestReport, SourceRef};
pub use transcript::{ChatMessage, Role, Transcript};
