//! Groq chat completion provider
//!
//! Groq serves an OpenAI-compatible `/chat/completions` endpoint. The API key
//! is read from configuration (`GROQ_API_KEY`) and only checked when a
//! completion is requested, so the server can start without one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::llm::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Groq-hosted chat model (llama-3.1-8b-instant by default)
pub struct GroqChat {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GroqChat {
    /// Create a new Groq client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: super::http_client(config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    /// Whether an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_body<'a>(&'a self, request: &'a LlmRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &request.system,
                },
                WireMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for GroqChat {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::llm("GROQ_API_KEY is not set"))?;

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| Error::llm(format!("Groq request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(Error::llm(format!("Groq API error: {} - {}", status, message)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("Failed to parse Groq response: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::llm("Groq response contained no message"))?;

        if let Some(usage) = parsed.usage {
            tracing::debug!(
                "Groq usage: {} prompt + {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        Ok(LlmResponse {
            text,
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            usage: parsed.usage,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.has_api_key())
    }

    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LlmRequest {
        LlmRequest {
            system: "Context: alpha".into(),
            user: "What is alpha?".into(),
            temperature: 0.0,
        }
    }

    #[test]
    fn test_body_has_system_then_user() {
        let chat = GroqChat::new(&LlmConfig::default()).unwrap();
        let req = request();
        let body = serde_json::to_value(chat.build_body(&req)).unwrap();

        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Context: alpha");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "What is alpha?");
    }

    #[test]
    fn test_parses_completion() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "model": "llama-3.1-8b-instant",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Alpha is first."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Alpha is first.")
        );
        assert_eq!(parsed.usage.unwrap().total_tokens, 16);
    }

    #[tokio::test]
    async fn test_missing_key_fails_at_call_time() {
        let config = LlmConfig {
            api_key: None,
            ..LlmConfig::default()
        };
        let chat = GroqChat::new(&config).unwrap();
        assert!(!chat.health_check().await.unwrap());

        let err = chat.complete(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[test]
    fn test_blank_key_treated_as_missing() {
        let config = LlmConfig {
            api_key: Some("  ".into()),
            ..LlmConfig::default()
        };
        assert!(!GroqChat::new(&config).unwrap().has_api_key());
    }
}
