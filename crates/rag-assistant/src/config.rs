//! Configuration for the RAG assistant

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::retrieval::HnswParams;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "rag-assistant.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Embedding provider configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Filesystem locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl RagConfig {
    /// Load configuration.
    ///
    /// Reads `path` if given, otherwise `$RAG_CONFIG`, otherwise
    /// `rag-assistant.toml` when it exists. Falls back to defaults, then
    /// applies environment overrides and validates.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("RAG_CONFIG").map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(key) = get("GROQ_API_KEY").filter(|k| !k.is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = get("OLLAMA_BASE_URL") {
            self.embeddings.base_url = url;
        }
        if let Some(host) = get("RAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("RAG_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(dir) = get("RAG_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("RAG_INDEX_DIR") {
            self.storage.index_dir = PathBuf::from(dir);
        }
        if let Some(model) = get("RAG_EMBED_MODEL") {
            self.embeddings.model = model;
        }
        if let Some(model) = get("RAG_LLM_MODEL") {
            self.llm.model = model;
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".into()));
        }
        if self.retrieval.hnsw_m == 0 || self.retrieval.hnsw_ef_construction == 0 {
            return Err(Error::Config(
                "retrieval.hnsw_m and retrieval.hnsw_ef_construction must be positive".into(),
            ));
        }
        if self.server.session_idle_secs == 0 {
            return Err(Error::Config("server.session_idle_secs must be positive".into()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 200MB)
    pub max_upload_size: usize,
    /// Sessions idle longer than this are dropped with their transcript
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            enable_cors: true,
            max_upload_size: 200 * 1024 * 1024,
            session_idle_secs: 60 * 60,
        }
    }
}

/// Embedding provider configuration (Ollama)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Model name (`all-minilm` is sentence-transformers/all-MiniLM-L6-v2)
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Request timeout in seconds; no deadline when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            dimensions: 384,
            timeout_secs: None,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the LLM
    pub top_k: usize,
    /// HNSW M parameter (connections per node)
    pub hnsw_m: usize,
    /// HNSW ef_construction parameter
    pub hnsw_ef_construction: usize,
    /// HNSW ef_search parameter
    pub hnsw_ef_search: usize,
}

impl RetrievalConfig {
    pub fn hnsw_params(&self) -> HnswParams {
        HnswParams {
            m: self.hnsw_m,
            ef_construction: self.hnsw_ef_construction,
            ef_search: self.hnsw_ef_search,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let hnsw = HnswParams::default();
        Self {
            top_k: 3,
            hnsw_m: hnsw.m,
            hnsw_ef_construction: hnsw.ef_construction,
            hnsw_ef_search: hnsw.ef_search,
        }
    }
}

/// LLM configuration (Groq, OpenAI-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Sampling temperature; 0 keeps answers factual
    pub temperature: f32,
    /// API credential, usually taken from `GROQ_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds; no deadline when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.0,
            api_key: None,
            timeout_secs: None,
        }
    }
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory uploaded documents are written to
    pub data_dir: PathBuf,
    /// Directory the vector index is persisted to
    pub index_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            index_dir: PathBuf::from("faiss_index"),
        }
    }
}
