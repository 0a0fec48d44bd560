//! Chat-completion client for the upstream planning model.
//!
//! Supports any server implementing the OpenAI chat completions API.
//! Each planning request is a single non-streaming call with one user
//! message; the service never keeps conversation history.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Model used when the deployment does not override it.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// The one capability the gateway needs from the planning model.
///
/// Handlers hold this behind `Arc<dyn CompletionBackend>` so tests can
/// swap in a canned backend without any HTTP.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send a single-prompt completion request and return the raw
    /// assistant text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Chat completion request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model ID to use for completion.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author (`system`, `user`, `assistant`).
    pub role: String,
    /// The content of the message. Upstream responses may carry `null`
    /// or omit the field entirely; both decode as an empty string.
    #[serde(default, deserialize_with = "null_to_empty")]
    pub content: String,
}

fn null_to_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatMessage {
    /// Build a user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: content.into(),
        }
    }
}

/// Chat completion response, reduced to the fields the service consumes.
/// Unknown response fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// List of completion choices.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// A single completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ChatMessage,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Configuration for the chat-completion client.
#[derive(Clone)]
pub struct CompletionConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible server.
    pub base_url: String,
    /// The model to use.
    pub model: String,
}

impl CompletionConfig {
    /// Create a new config with the given API key and base URL.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Chat-completion client over an OpenAI-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    config: CompletionConfig,
    client: reqwest::Client,
}

impl ChatCompletionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CompletionConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    /// Normalized completions endpoint for the configured base URL.
    ///
    /// Accepts base URLs with or without a trailing `/v1` segment.
    fn completions_url(&self) -> String {
        let base = match self.config.base_url.strip_suffix("/v1") {
            Some(u) => u,
            None => &self.config.base_url,
        };
        let base = base.trim_end_matches('/');
        format!("{base}/v1/chat/completions")
    }

    /// Map an HTTP error status to the appropriate ApiError.
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> ApiError {
        let message = extract_error_message(body);
        match status.as_u16() {
            401 => ApiError::Upstream(format!("completion authentication failed: {message}")),
            429 => ApiError::Upstream(format!("completion rate limited: {message}")),
            _ => ApiError::Upstream(format!("completion HTTP {}: {message}", status.as_u16())),
        }
    }
}

/// Extract an error message from an upstream error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_owned())
}

#[async_trait]
impl CompletionBackend for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
        };

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("completion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, &body_text));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ApiError::Upstream(format!("completion response could not be decoded: {e}"))
        })?;

        // A response with no choices is not a transport failure; the empty
        // text fails downstream at the JSON parse step instead.
        Ok(completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default())
    }
}
