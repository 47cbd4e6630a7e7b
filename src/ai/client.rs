//! LLM API client module
//!
//! Sends a single-turn chat completion to an OpenAI-compatible endpoint
//! (Gemini exposes one) and retries transient overload errors.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::errors::DraftError;

/// Total attempts per generation, first call included.
pub const MAX_GENERATION_ATTEMPTS: usize = 3;

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// Text generation boundary used by the draft pipeline.
#[async_trait]
pub trait DraftGenerator: Send + Sync {
    /// Generate text for `prompt`. Transient failures are retried internally.
    async fn generate(&self, prompt: &str) -> Result<String, DraftError>;
}

/// LLM API client for generating drafts
pub struct LlmClient {
    http: Client,
    api_key: String,
    base_url: String,
    model_name: String,
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, DraftError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| DraftError::HttpError(format!("Failed to build LLM HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.llm_api_key.clone(),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            model_name: config.llm_model.clone(),
        })
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    #[must_use]
    pub fn build_messages(prompt: &str) -> Vec<ChatCompletionMessage> {
        vec![ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::Text(prompt.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }]
    }

    async fn complete_once(&self, messages: &[Value]) -> Result<String, DraftError> {
        let request_body = json!({
            "model": self.model_name,
            "messages": messages,
            "temperature": 0.7,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(classify_status(status, &error_text));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| DraftError::GenerationFailed(format!("Failed to parse LLM response: {e}")))?;

        extract_completion_text(&response_json)
            .ok_or_else(|| DraftError::GenerationFailed("No text in response".to_string()))
    }
}

#[async_trait]
impl DraftGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, DraftError> {
        #[cfg(feature = "debug-logs")]
        info!("Using LLM prompt:\n{}", prompt);

        info!(
            model = %self.model_name,
            estimated_input_tokens = estimate_tokens(prompt),
            "Generating draft"
        );

        let messages = build_chat_input(&Self::build_messages(prompt));
        // 500ms, 1s, ...
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(250)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(MAX_GENERATION_ATTEMPTS - 1);

        RetryIf::spawn(
            strategy,
            || self.complete_once(&messages),
            |e: &DraftError| {
                let retry = e.is_transient();
                if retry {
                    warn!(error = %e, "LLM overloaded, retrying");
                }
                retry
            },
        )
        .await
        .map_err(|e| match e {
            DraftError::GenerationFailed(_) => e,
            other => DraftError::GenerationFailed(other.to_string()),
        })
    }
}

fn classify_status(status: StatusCode, body: &str) -> DraftError {
    let detail = format!("LLM API error (status {status}): {body}");
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        DraftError::UpstreamUnavailable(detail)
    } else {
        DraftError::GenerationFailed(detail)
    }
}

/// Convert typed chat messages into the wire `messages` array.
pub(crate) fn build_chat_input(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(|m| {
            let role = match m.role {
                MessageRole::system => "system",
                MessageRole::assistant => "assistant",
                MessageRole::user => "user",
                _ => return None,
            };
            match &m.content {
                Content::Text(text) => Some(json!({ "role": role, "content": text })),
                _ => None,
            }
        })
        .collect()
}

fn extract_completion_text(response: &Value) -> Option<String> {
    let content = response
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?;

    let text = match content {
        Value::String(s) => s.clone(),
        // Some providers return typed parts instead of a plain string.
        Value::Array(parts) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(""),
        _ => return None,
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
