//! Document ingestion: PDF loading, chunking, and index building

mod chunker;
mod parser;
mod processor;

pub use chunker::{TextChunker, DEFAULT_SEPARATORS};
pub use parser::{hash_bytes, PdfLoader};
pub use processor::IngestPipeline;
