use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::provider::{
    messages_body, ChatRequest, ChatResponse, LlmProvider, MessagesResponse, ProviderError,
};

const API_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Direct Anthropic Messages API provider, for deployments without Bedrock.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

fn build_body(req: &ChatRequest) -> serde_json::Value {
    let mut body = messages_body(req);
    body["model"] = serde_json::json!(req.model);
    body
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, req), fields(model = %req.model))]
    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        debug!("sending request to Anthropic");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&build_body(req))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 429 {
            let retry = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(5000);
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry,
            });
        }
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Anthropic API error");
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        let api_resp: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(api_resp.into_chat(&req.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Message;

    #[test]
    fn body_names_the_model() {
        let req = ChatRequest {
            model: "claude-3-5-sonnet-latest".into(),
            system: String::new(),
            messages: vec![Message::user("hello")],
            max_tokens: 256,
            temperature: 0.2,
        };
        let body = build_body(&req);
        assert_eq!(body["model"], "claude-3-5-sonnet-latest");
        assert!(body.get("anthropic_version").is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let p = AnthropicProvider::new("k".into(), Some("http://localhost:8080/".into()));
        assert_eq!(p.base_url, "http://localhost:8080");
    }
}
