//! Application state for the RAG server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::providers::{EmbeddingProvider, GroqChat, LlmProvider, OllamaEmbedder};
use crate::session::{SessionManager, SessionShell};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Embedding provider (kept for readiness and info)
    embedder: Arc<dyn EmbeddingProvider>,
    /// LLM provider (kept for info)
    llm: Arc<dyn LlmProvider>,
    /// Sessions plus the upload/process/ask workflow
    shell: SessionShell,
}

impl AppState {
    /// Create state with the Ollama embedder and Groq chat model
    pub fn new(config: RagConfig) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::new(&config.embeddings)?);
        let llm: Arc<dyn LlmProvider> = Arc::new(GroqChat::new(&config.llm)?);
        tracing::info!(
            "Providers: {} ({}) for embeddings, {} ({}) for answers",
            embedder.name(),
            embedder.model(),
            llm.name(),
            llm.model()
        );
        Ok(Self::with_providers(config, embedder, llm))
    }

    /// Create state around caller-supplied providers
    pub fn with_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let shell = SessionShell::new(&config, Arc::clone(&embedder), Arc::clone(&llm));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                embedder,
                llm,
                shell,
            }),
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    pub fn shell(&self) -> &SessionShell {
        &self.inner.shell
    }

    pub fn sessions(&self) -> &SessionManager {
        self.inner.shell.sessions()
    }

    /// Ready once an index exists to answer from
    pub fn is_ready(&self) -> bool {
        self.inner.shell.has_index()
    }
}
