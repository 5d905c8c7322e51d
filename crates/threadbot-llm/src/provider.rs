use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single message in the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// Request to an LLM provider.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    /// Sent as the top-level `system` field; omitted when empty.
    pub system: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Response from an LLM provider.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Concatenated text blocks; may be empty.
    pub content: String,
    pub model: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub stop_reason: String,
}

/// Common interface for the text-generation backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging and error messages.
    fn name(&self) -> &str;

    /// Send a chat request and wait for the full response.
    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl From<threadbot_aws::AwsError> for ProviderError {
    fn from(e: threadbot_aws::AwsError) -> Self {
        match e {
            threadbot_aws::AwsError::Http(e) => ProviderError::Http(e),
            other => ProviderError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Deserialize)]
pub(crate) struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Deserialize, Default)]
pub(crate) struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

impl MessagesResponse {
    /// Flatten a Messages-API response. Non-text blocks are dropped.
    pub(crate) fn into_chat(self, requested_model: &str) -> ChatResponse {
        let content = self
            .content
            .into_iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");

        ChatResponse {
            content,
            model: self.model.unwrap_or_else(|| requested_model.to_string()),
            tokens_in: self.usage.input_tokens,
            tokens_out: self.usage.output_tokens,
            stop_reason: self.stop_reason.unwrap_or_default(),
        }
    }
}

/// Fields shared by the Anthropic and Bedrock message bodies.
pub(crate) fn messages_body(req: &ChatRequest) -> serde_json::Value {
    let mut body = serde_json::json!({
        "max_tokens": req.max_tokens,
        "temperature": req.temperature,
        "messages": req.messages,
    });
    if !req.system.is_empty() {
        body["system"] = serde_json::json!(req.system);
    }
    body
}
