//! Ollama embedding provider
//!
//! Talks to a local Ollama server through `POST /api/embed`, which accepts a
//! batch of inputs and returns one vector per input.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Ollama embedding provider (all-minilm by default)
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            client: super::http_client(config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    async fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let body = EmbedRequest {
            model: &self.model,
            input,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "Ollama API error: {} - {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse Ollama response: {}", e)))?;

        if parsed.embeddings.len() != input.len() {
            return Err(Error::embedding(format!(
                "Ollama returned {} embeddings for {} inputs",
                parsed.embeddings.len(),
                input.len()
            )));
        }

        Ok(parsed.embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::embedding("Ollama returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!("Embedding {} texts with {}", texts.len(), self.model);
        self.request(texts).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => {
                tracing::debug!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> EmbeddingConfig {
        EmbeddingConfig {
            base_url: base_url.to_string(),
            ..EmbeddingConfig::default()
        }
    }

    #[test]
    fn test_request_shape() {
        let input = vec!["a".to_string(), "b".to_string()];
        let body = serde_json::to_value(EmbedRequest {
            model: "all-minilm",
            input: &input,
        })
        .unwrap();
        assert_eq!(body["model"], "all-minilm");
        assert_eq!(body["input"][1], "b");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let embedder = OllamaEmbedder::new(&config("http://localhost:11434/")).unwrap();
        assert_eq!(embedder.base_url, "http://localhost:11434");
        assert_eq!(embedder.model(), "all-minilm");
        assert_eq!(embedder.dimensions(), 384);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unhealthy() {
        let embedder = OllamaEmbedder::new(&config("http://127.0.0.1:1")).unwrap();
        assert!(!embedder.health_check().await.unwrap());

        let err = embedder.embed("hello").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let embedder = OllamaEmbedder::new(&config("http://127.0.0.1:1")).unwrap();
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }
}
