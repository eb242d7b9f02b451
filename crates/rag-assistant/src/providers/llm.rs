//! LLM provider trait for answer generation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single chat completion: one system message, one user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// System instruction with the retrieved context filled in
    pub system: String,
    /// The user's question, verbatim
    pub user: String,
    /// Sampling temperature
    pub temperature: f32,
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Generated answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Assistant message text
    pub text: String,
    /// Model that produced the answer
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Trait for LLM-based answer generation
///
/// Implementations:
/// - `GroqChat`: Groq's OpenAI-compatible chat completions API
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one chat completion
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
