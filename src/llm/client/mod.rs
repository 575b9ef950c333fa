//! LLM client for patent review.
//!
//! Talks to OpenAI-compatible `/chat/completions` endpoints (Kimi, DeepSeek or
//! a custom base URL). One request per review; no retries.

mod config;
mod prompts;

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

pub use config::{ConfigError, Endpoint, LlmConfig, LlmProvider, ProviderPreset, ProviderPresets};
pub use prompts::{user_message, DEFAULT_REVIEW_PROMPT, SYSTEM_PROMPT};

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Rejected before any request was sent
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failed to reach the service
    #[error("Connection error: {0}")]
    Connection(String),

    /// Non-success HTTP status; the body is logged, not kept
    #[error("API请求失败: {status} {reason}")]
    Status { status: u16, reason: String },

    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
}

/// LLM client for document review.
pub struct LlmClient {
    config: LlmConfig,
    endpoint: Endpoint,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl LlmClient {
    /// Create a client using the built-in provider presets.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        Self::with_presets(config, &ProviderPresets::builtin())
    }

    /// Create a client, resolving the endpoint against `presets`.
    ///
    /// Fails with [`ConfigError`] when the key or base URL is missing, so no
    /// request is ever attempted with an incomplete configuration.
    pub fn with_presets(config: LlmConfig, presets: &ProviderPresets) -> Result<Self, LlmError> {
        let endpoint = config.resolve(presets)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Send `text` for review and return the raw response content.
    ///
    /// `review_prompt` falls back to the configured prompt. An empty string
    /// is returned when the response carries no content.
    pub async fn review(&self, text: &str, review_prompt: Option<&str>) -> Result<String, LlmError> {
        let prompt = review_prompt
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| self.config.get_review_prompt());
        let user = user_message(text, prompt);

        let request = ChatRequest {
            model: &self.endpoint.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = self.endpoint.completions_url();
        info!(
            "Requesting review from {} ({} chars)",
            self.endpoint.model,
            text.chars().count()
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.endpoint.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!("API响应错误 ({}): {}", status, body);
            return Err(LlmError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = extract_content(chat);
        debug!("Review response: {} chars", content.chars().count());
        Ok(content)
    }
}

/// `choices[0].message.content`, or empty.
fn extract_content(response: ChatResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default()
}
