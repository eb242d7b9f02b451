//! Session actions: upload a PDF, build the index, ask questions

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::AnsweringPipeline;
use crate::ingestion::{hash_bytes, IngestPipeline};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::IndexStore;
use crate::types::response::{ChatResponse, UploadResponse};
use crate::types::{ChatMessage, FileType, IngestReport};

use super::{Session, SessionManager};

/// Status shown after a successful build
pub const INDEX_BUILT_MESSAGE: &str = "Database built! You can now ask questions.";

/// Reduce a client-supplied filename to its final path component
pub fn sanitize_filename(raw: &str) -> Result<String> {
    // Browsers on Windows may send a full "C:\fakepath\name.pdf"
    let last = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("").trim();
    if last.is_empty() || last == "." || last == ".." {
        return Err(Error::BadRequest(format!("Invalid filename: '{}'", raw)));
    }
    Ok(last.to_string())
}

/// Drives the upload → process → ask workflow for sessions.
///
/// All sessions share one upload directory and one index location, so the
/// index always reflects the most recent successful build.
pub struct SessionShell {
    sessions: SessionManager,
    ingest: IngestPipeline,
    answering: AnsweringPipeline,
    data_dir: PathBuf,
    index_dir: PathBuf,
}

impl SessionShell {
    pub fn new(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            sessions: SessionManager::with_idle_timeout(Duration::from_secs(
                config.server.session_idle_secs,
            )),
            ingest: IngestPipeline::from_config(config, Arc::clone(&embedder)),
            answering: AnsweringPipeline::from_config(config, embedder, llm),
            data_dir: config.storage.data_dir.clone(),
            index_dir: config.storage.index_dir.clone(),
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Whether an index has been built
    pub fn has_index(&self) -> bool {
        IndexStore::exists(&self.index_dir)
    }

    /// Store an uploaded file verbatim under the data directory, overwriting
    /// any previous file with the same name. Type and content are checked when
    /// processing.
    pub async fn upload(
        &self,
        session: &Session,
        filename: &str,
        data: &[u8],
    ) -> Result<UploadResponse> {
        let _guard = session.begin_action().await;

        let filename = sanitize_filename(filename)?;

        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.data_dir.join(&filename);
        tokio::fs::write(&path, data).await?;

        tracing::info!(
            "Session {} uploaded {} ({} bytes)",
            session.id(),
            filename,
            data.len()
        );

        Ok(UploadResponse {
            message: format!("Uploaded: {}", filename),
            size_bytes: data.len() as u64,
            content_hash: hash_bytes(data),
            filename,
        })
    }

    /// Build the shared index from a previously uploaded file
    pub async fn process(&self, session: &Session, filename: &str) -> Result<IngestReport> {
        let _guard = session.begin_action().await;

        let filename = sanitize_filename(filename)?;
        if !FileType::from_filename(&filename).is_supported() {
            return Err(Error::UnsupportedFileType(filename));
        }

        let path = self.data_dir.join(&filename);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(Error::DocumentNotFound(filename));
        }

        tracing::info!("Session {} processing {}", session.id(), filename);
        self.ingest.build_index(&path, &self.index_dir).await
    }

    /// Answer a question and record the exchange in the transcript.
    ///
    /// The user entry is appended before answering and stays even if the
    /// answering pipeline fails.
    pub async fn ask(&self, session: &Session, question: &str) -> Result<ChatResponse> {
        let _guard = session.begin_action().await;

        if question.trim().is_empty() {
            return Err(Error::BadRequest("Question must not be empty".into()));
        }

        session.push(ChatMessage::user(question));
        let answer = self.answering.ask(question, &self.index_dir).await?;
        session.push(ChatMessage::assistant(answer.text.clone()));

        Ok(ChatResponse {
            answer: answer.text,
            sources: answer.sources,
            messages: session.messages(),
        })
    }
}
