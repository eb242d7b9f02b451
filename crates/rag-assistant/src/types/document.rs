//! Document, page, and chunk types with source tracking

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported upload types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Anything else
    Unknown,
}

impl FileType {
    /// Detect file type from a filename's extension
    pub fn from_filename(filename: &str) -> Self {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if ext.eq_ignore_ascii_case("pdf") {
            Self::Pdf
        } else {
            Self::Unknown
        }
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

/// Text of one page as produced by the loader
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    /// Page index (0-based, loader convention)
    pub page: u32,
    /// Extracted text
    pub content: String,
}

/// A loaded document: ordered page texts plus bookkeeping
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Original filename
    pub filename: String,
    /// Pages in document order
    pub pages: Vec<PageText>,
    /// SHA-256 of the raw file bytes
    pub content_hash: String,
}

impl LoadedDocument {
    /// Total number of pages
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }
}

/// Provenance of a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSource {
    /// Original filename as uploaded
    pub filename: String,
    /// Page index (0-based)
    pub page: u32,
    /// Total pages in the document
    pub page_count: u32,
}

impl ChunkSource {
    /// Format source for display ("report.pdf, Page 3")
    pub fn format_citation(&self) -> String {
        format!("{}, Page {}", self.filename, self.page + 1)
    }
}

/// A window of document text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Text content
    pub content: String,
    /// Source information
    pub source: ChunkSource,
    /// Chunk index within the document
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(content: String, source: ChunkSource, chunk_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            source,
            chunk_index,
        }
    }
}
