//! Provider abstractions for embeddings and chat completion
//!
//! The pipelines only see the traits, so the HTTP backends can be swapped
//! for in-process implementations in tests.

pub mod embedding;
pub mod groq;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use groq::GroqChat;
pub use llm::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use ollama::OllamaEmbedder;

use std::time::Duration;

use crate::error::{Error, Result};

/// Build a reqwest client with an optional overall timeout
pub(crate) fn http_client(timeout_secs: Option<u64>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))
}
