//! Index building: load, split, embed, persist

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::retrieval::{HnswParams, IndexStore, VectorIndex};
use crate::types::{IngestReport, LoadedDocument};

use super::chunker::TextChunker;
use super::parser::PdfLoader;

/// Builds a persisted vector index from one PDF
pub struct IngestPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: TextChunker,
    hnsw: HnswParams,
}

impl IngestPipeline {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, chunker: TextChunker) -> Self {
        Self {
            embedder,
            chunker,
            hnsw: HnswParams::default(),
        }
    }

    pub fn from_config(config: &RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(embedder, TextChunker::from_config(&config.chunking))
            .with_hnsw(config.retrieval.hnsw_params())
    }

    /// Graph parameters for indexes built by this pipeline
    pub fn with_hnsw(mut self, params: HnswParams) -> Self {
        self.hnsw = params;
        self
    }

    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    /// Build an index from the PDF at `document_path` and store it at
    /// `index_location`, replacing any previous index.
    ///
    /// On error the previous index is left untouched.
    pub async fn build_index(
        &self,
        document_path: &Path,
        index_location: &Path,
    ) -> Result<IngestReport> {
        let path: PathBuf = document_path.to_path_buf();
        let document = tokio::task::spawn_blocking(move || PdfLoader::load_file(&path))
            .await
            .map_err(|e| Error::internal(format!("PDF load task failed: {}", e)))??;

        self.build_index_from_document(document, index_location).await
    }

    /// Same as [`build_index`](Self::build_index) for an already loaded document
    pub async fn build_index_from_document(
        &self,
        document: LoadedDocument,
        index_location: &Path,
    ) -> Result<IngestReport> {
        let start = Instant::now();
        tracing::info!(
            "Loaded {} ({} pages)",
            document.filename,
            document.page_count()
        );

        let chunks = self.chunker.chunk_document(&document);
        if chunks.is_empty() {
            return Err(Error::file_parse(
                &document.filename,
                "No text content could be extracted from PDF",
            ));
        }
        tracing::info!(
            "Split {} into {} chunks (size {}, overlap {})",
            document.filename,
            chunks.len(),
            self.chunker.chunk_size(),
            self.chunker.chunk_overlap()
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "{} returned {} embeddings for {} chunks",
                self.embedder.name(),
                embeddings.len(),
                chunks.len()
            )));
        }

        let chunk_count = chunks.len();
        let index = VectorIndex::build_with(self.hnsw, self.embedder.model(), chunks, embeddings)?;

        let location = index_location.to_path_buf();
        tokio::task::spawn_blocking(move || IndexStore::save(&index, &location))
            .await
            .map_err(|e| Error::internal(format!("Index save task failed: {}", e)))??;

        let elapsed = start.elapsed();
        tracing::info!(
            "Built index for {} in {:.1}s",
            document.filename,
            elapsed.as_secs_f64()
        );

        Ok(IngestReport {
            filename: document.filename,
            pages: document.pages.len() as u32,
            chunks: chunk_count,
            index_dir: index_location.display().to_string(),
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::LoadOutcome;
    use crate::types::PageText;
    use async_trait::async_trait;

    struct LengthEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }
        fn dimensions(&self) -> usize {
            2
        }
        fn model(&self) -> &str {
            "length"
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "length"
        }
    }

    struct DownEmbedder;

    #[async_trait]
    impl EmbeddingProvider for DownEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::embedding("provider unavailable"))
        }
        fn dimensions(&self) -> usize {
            2
        }
        fn model(&self) -> &str {
            "length"
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }
        fn name(&self) -> &str {
            "down"
        }
    }

    fn document(pages: &[&str]) -> LoadedDocument {
        LoadedDocument {
            filename: "report.pdf".into(),
            pages: pages
                .iter()
                .enumerate()
                .map(|(i, p)| PageText {
                    page: i as u32,
                    content: p.to_string(),
                })
                .collect(),
            content_hash: String::new(),
        }
    }

    #[tokio::test]
    async fn test_chunk_count_matches_splitter() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("faiss_index");
        let pipeline = IngestPipeline::new(Arc::new(LengthEmbedder), TextChunker::default());

        let long = "lorem ipsum dolor sit amet ".repeat(120);
        let doc = document(&[&long, "short page"]);
        let expected = pipeline.chunker().chunk_document(&doc).len();

        let report = pipeline
            .build_index_from_document(doc, &location)
            .await
            .unwrap();
        assert_eq!(report.chunks, expected);
        assert_eq!(report.pages, 2);

        match IndexStore::load(&location, "length") {
            LoadOutcome::Found(index) => assert_eq!(index.len(), expected),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_document_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("faiss_index");
        let pipeline = IngestPipeline::new(Arc::new(LengthEmbedder), TextChunker::default());

        let err = pipeline
            .build_index_from_document(document(&["", "   "]), &location)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
        assert!(!location.exists());
    }

    #[tokio::test]
    async fn test_embedding_failure_keeps_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("faiss_index");

        IngestPipeline::new(Arc::new(LengthEmbedder), TextChunker::default())
            .build_index_from_document(document(&["first build"]), &location)
            .await
            .unwrap();

        let err = IngestPipeline::new(Arc::new(DownEmbedder), TextChunker::default())
            .build_index_from_document(document(&["second build"]), &location)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));

        match IndexStore::load(&location, "length") {
            LoadOutcome::Found(index) => assert_eq!(index.chunks()[0].content, "first build"),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_configured_graph_params_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("faiss_index");
        let params = HnswParams {
            m: 4,
            ef_construction: 40,
            ef_search: 10,
        };

        IngestPipeline::new(Arc::new(LengthEmbedder), TextChunker::default())
            .with_hnsw(params)
            .build_index_from_document(document(&["one page"]), &location)
            .await
            .unwrap();

        match IndexStore::load(&location, "length") {
            LoadOutcome::Found(index) => assert_eq!(index.params(), params),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_pdf_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = IngestPipeline::new(Arc::new(LengthEmbedder), TextChunker::default());
        let err = pipeline
            .build_index(&dir.path().join("absent.pdf"), &dir.path().join("idx"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }
}
