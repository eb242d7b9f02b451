//! Recursive character text splitting with page tracking
//!
//! Text is cut at the coarsest separator that occurs in it (paragraph, line,
//! word, then single characters). Pieces are merged back into windows of at most
//! `chunk_size` characters, and each new window starts with up to
//! `chunk_overlap` characters carried over from the previous one.

use std::collections::VecDeque;

use crate::config::ChunkingConfig;
use crate::types::{Chunk, ChunkSource, LoadedDocument};

/// Separators tried in order; the empty separator splits into characters
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character splitter with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters shared between adjacent chunks
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextChunker {
    /// Create a new chunker with the default separators
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Chunk every page of a loaded document.
    ///
    /// Pages are split independently, so windows never straddle a page
    /// boundary. Chunk indices run across the whole document.
    pub fn chunk_document(&self, doc: &LoadedDocument) -> Vec<Chunk> {
        let page_count = doc.page_count();
        let mut chunks = Vec::new();

        for page in &doc.pages {
            for text in self.split_text(&page.content) {
                let source = ChunkSource {
                    filename: doc.filename.clone(),
                    page: page.page,
                    page_count,
                };
                let index = chunks.len() as u32;
                chunks.push(Chunk::new(text, source, index));
            }
        }

        chunks
    }

    /// Split text into overlapping windows
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        // Coarsest separator present in the text; finer ones are the fallback
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut fallback: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                fallback = &separators[i + 1..];
                break;
            }
        }

        let mut good_splits: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }

            if fallback.is_empty() {
                final_chunks.push(piece.to_string());
            } else {
                final_chunks.extend(self.split_recursive(piece, fallback));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }

        final_chunks
    }

    /// Merge small pieces into windows, carrying overlap forward
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in splits {
            let len = char_len(piece);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }

                if !current.is_empty() {
                    if let Some(doc) = join_pieces(&current) {
                        docs.push(doc);
                    }

                    // Drop from the front until only the overlap remains and
                    // the incoming piece fits
                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match current.pop_front() {
                            Some(first) => total -= char_len(first),
                            None => break,
                        }
                    }
                }
            }

            current.push_back(piece);
            total += len;
        }

        if let Some(doc) = join_pieces(&current) {
            docs.push(doc);
        }

        docs
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

/// Split at every occurrence of `separator`, attaching the separator to the
/// start of the following piece. Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;
    for (pos, _) in text.match_indices(separator) {
        if pos > start {
            pieces.push(&text[start..pos]);
        }
        start = pos;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn join_pieces(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
