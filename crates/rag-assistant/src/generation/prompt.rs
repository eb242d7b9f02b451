//! Prompt templates for RAG generation

use crate::retrieval::SearchHit;
use crate::providers::LlmRequest;

/// Prompt builder for grounded question answering
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunk texts, best match first
    pub fn build_context(hits: &[SearchHit]) -> String {
        hits.iter()
            .map(|h| h.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// System instruction with the retrieved context filled in
    pub fn build_system_prompt(context: &str) -> String {
        format!(
            r#"You are an intelligent enterprise assistant. Use the following pieces of retrieved context to answer the user's question. If the answer is not in the context, just say that you don't know. Do not make up information. Keep the answer professional.

Context: {context}"#,
            context = context
        )
    }

    /// Full chat request: system instruction plus the question as the user turn
    pub fn build_request(question: &str, hits: &[SearchHit], temperature: f32) -> LlmRequest {
        LlmRequest {
            system: Self::build_system_prompt(&Self::build_context(hits)),
            user: question.to_string(),
            temperature,
        }
    }
}
