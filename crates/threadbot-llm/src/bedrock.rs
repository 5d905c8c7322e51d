//! AWS Bedrock provider (Claude models via InvokeModel).
//!
//! Request and response bodies follow the Anthropic Messages format with the
//! Bedrock-specific `anthropic_version`. Signing is delegated to
//! `threadbot_aws::AwsClient`.

use async_trait::async_trait;
use threadbot_aws::AwsClient;
use tracing::{debug, instrument, warn};

use crate::provider::{
    messages_body, ChatRequest, ChatResponse, LlmProvider, MessagesResponse, ProviderError,
};

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
/// Signing name; the host is `bedrock-runtime`.
pub const SERVICE: &str = "bedrock";

pub struct BedrockProvider {
    client: AwsClient,
}

impl BedrockProvider {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }

    /// Resolve credentials from the standard AWS chain.
    pub fn from_env(region: &str, profile: Option<&str>) -> Result<Self, ProviderError> {
        Ok(Self::new(AwsClient::from_env(region, SERVICE, profile)?))
    }

    fn endpoint(&self, model_id: &str) -> String {
        invoke_url(self.client.region(), model_id)
    }
}

/// Model ids contain `:` (e.g. `...-v1:0`), so the id is percent-encoded
/// as a single path segment.
fn invoke_url(region: &str, model_id: &str) -> String {
    format!(
        "https://bedrock-runtime.{region}.amazonaws.com/model/{}/invoke",
        urlencoding::encode(model_id)
    )
}

fn build_body(req: &ChatRequest) -> serde_json::Value {
    let mut body = messages_body(req);
    body["anthropic_version"] = serde_json::json!(ANTHROPIC_VERSION);
    body
}

#[async_trait]
impl LlmProvider for BedrockProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    #[instrument(skip(self, req), fields(model = %req.model))]
    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = self.endpoint(&req.model);
        let body =
            serde_json::to_vec(&build_body(req)).map_err(|e| ProviderError::Parse(e.to_string()))?;

        debug!(region = %self.client.region(), "sending request to AWS Bedrock");

        let resp = self
            .client
            .post(
                &url,
                &[
                    ("content-type", "application/json"),
                    ("accept", "application/json"),
                ],
                body,
            )
            .await?;

        let status = resp.status().as_u16();
        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_ms: 5000,
            });
        }
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Bedrock API error");
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
    fn model_id_is_encoded_into_path() {
        assert_eq!(
            invoke_url("us-east-1", "anthropic.claude-3-sonnet-20240229-v1:0"),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/anthropic.claude-3-sonnet-20240229-v1%3A0/invoke"
        );
    }

    #[test]
    fn body_carries_bedrock_version_and_sampling() {
        let req = ChatRequest {
            model: "anthropic.claude-3-sonnet-20240229-v1:0".into(),
            system: String::new(),
            messages: vec![Message::user("Summarize this")],
            max_tokens: 1000,
            temperature: 0.7,
        };
        let body = build_body(&req);
        assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(body["max_tokens"], 1000);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["messages"][0]["content"], "Summarize this");
        // the model id travels in the URL, never in the body
        assert!(body.get("model").is_none());
    }
}
