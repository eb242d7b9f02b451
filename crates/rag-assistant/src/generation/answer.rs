//! Question answering over a persisted index

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::{IndexStore, LoadOutcome};
use crate::types::SourceRef;

use super::prompt::PromptBuilder;

/// Returned instead of an answer when no usable index exists
pub const DATABASE_NOT_FOUND: &str =
    "⚠️ Error: Database not found. Please upload and process a PDF first.";

/// An answer and the chunks it was grounded on
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    /// Empty when no index was available
    pub sources: Vec<SourceRef>,
}

impl Answer {
    fn not_found() -> Self {
        Self {
            text: DATABASE_NOT_FOUND.to_string(),
            sources: Vec::new(),
        }
    }
}

/// Load index, retrieve, prompt, generate
pub struct AnsweringPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
    temperature: f32,
}

impl AnsweringPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        top_k: usize,
        temperature: f32,
    ) -> Self {
        Self {
            embedder,
            llm,
            top_k,
            temperature,
        }
    }

    pub fn from_config(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self::new(
            embedder,
            llm,
            config.retrieval.top_k,
            config.llm.temperature,
        )
    }

    /// Answer text only
    pub async fn answer(&self, question: &str, index_location: &Path) -> Result<String> {
        Ok(self.ask(question, index_location).await?.text)
    }

    /// Answer `question` from the index at `index_location`.
    ///
    /// A missing or unreadable index yields [`DATABASE_NOT_FOUND`] without
    /// calling either provider. Provider failures after the index loads are
    /// returned as errors.
    pub async fn ask(&self, question: &str, index_location: &Path) -> Result<Answer> {
        let location: PathBuf = index_location.to_path_buf();
        let model = self.embedder.model().to_string();
        let outcome = tokio::task::spawn_blocking(move || IndexStore::load(&location, &model))
            .await
            .map_err(|e| Error::internal(format!("Index load task failed: {}", e)))?;

        let index = match outcome {
            LoadOutcome::Found(index) => index,
            LoadOutcome::NotFound => {
                tracing::info!("No index at {}", index_location.display());
                return Ok(Answer::not_found());
            }
            LoadOutcome::Corrupt(reason) => {
                tracing::warn!("Ignoring unreadable index: {}", reason);
                return Ok(Answer::not_found());
            }
        };

        let query_vector = self.embedder.embed(question).await?;
        let hits = index.query(&query_vector, self.top_k);
        tracing::debug!(
            "Retrieved {} of {} chunks for question",
            hits.len(),
            index.len()
        );

        let request = PromptBuilder::build_request(question, &hits, self.temperature);
        let response = self.llm.complete(&request).await?;

        tracing::info!(
            "Answered with {} ({} sources)",
            response.model,
            hits.len()
        );

        Ok(Answer {
            text: response.text,
            sources: hits
                .iter()
                .map(|h| SourceRef::from_chunk(&h.chunk, h.similarity))
                .collect(),
        })
    }
}
