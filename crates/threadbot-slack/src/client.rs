use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::api::SlackApi;
use crate::error::{Result, SlackError};
use crate::types::{ThreadMessage, UserInfo};

const DEFAULT_BASE_URL: &str = "https://slack.com/api";
/// Upper bound on messages fetched for one thread.
pub const THREAD_FETCH_LIMIT: u32 = 1000;

/// Slack Web API client authenticated with a bot token.
pub struct SlackClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl SlackClient {
    /// An empty `token` yields a client whose every call returns
    /// [`SlackError::NotConfigured`].
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.token.is_empty()
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    fn token(&self) -> Result<&str> {
        if self.token.is_empty() {
            return Err(SlackError::NotConfigured);
        }
        Ok(&self.token)
    }

    /// POST a JSON body to a write method.
    async fn post_json(&self, method: &str, body: &Value) -> Result<Value> {
        let resp = self
            .http
            .post(self.url(method))
            .bearer_auth(self.token()?)
            .json(body)
            .send()
            .await?;
        check_ok(method, resp.json().await?)
    }

    /// GET a read method with query parameters.
    async fn get_query(&self, method: &str, query: &[(&str, &str)]) -> Result<Value> {
        let resp = self
            .http
            .get(self.url(method))
            .bearer_auth(self.token()?)
            .query(query)
            .send()
            .await?;
        check_ok(method, resp.json().await?)
    }
}

/// Every Web API response carries `ok`; `ok: false` comes with an `error` code.
fn check_ok(method: &str, body: Value) -> Result<Value> {
    if body.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(body);
    }
    let error = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error")
        .to_string();
    Err(SlackError::Api {
        method: method.to_string(),
        error,
    })
}

fn field<T: DeserializeOwned>(body: &mut Value, name: &str) -> Result<T> {
    let v = body
        .get_mut(name)
        .map(Value::take)
        .ok_or_else(|| SlackError::Parse(format!("response has no `{name}`")))?;
    serde_json::from_value(v).map_err(|e| SlackError::Parse(e.to_string()))
}

/// Reaction calls whose only failure is that the end state already holds.
fn is_benign_reaction_error(err: &SlackError) -> bool {
    matches!(err, SlackError::Api { error, .. } if error == "already_reacted" || error == "no_reaction")
}

fn post_message_body(channel: &str, thread_ts: &str, text: &str) -> Value {
    json!({
        "channel": channel,
        "thread_ts": thread_ts,
        "text": text,
        "blocks": [{
            "type": "section",
            "text": { "type": "mrkdwn", "text": text },
        }],
    })
}

#[async_trait]
impl SlackApi for SlackClient {
    #[instrument(skip(self), fields(channel = %channel))]
    async fn add_reaction(&self, channel: &str, ts: &str, name: &str) -> Result<()> {
        let body = json!({ "channel": channel, "timestamp": ts, "name": name });
        match self.post_json("reactions.add", &body).await {
            Err(e) if is_benign_reaction_error(&e) => Ok(()),
            other => other.map(|_| ()),
        }
    }

    #[instrument(skip(self), fields(channel = %channel))]
    async fn remove_reaction(&self, channel: &str, ts: &str, name: &str) -> Result<()> {
        let body = json!({ "channel": channel, "timestamp": ts, "name": name });
        match self.post_json("reactions.remove", &body).await {
            Err(e) if is_benign_reaction_error(&e) => Ok(()),
            other => other.map(|_| ()),
        }
    }

    #[instrument(skip(self, text), fields(channel = %channel, len = text.len()))]
    async fn post_message(&self, channel: &str, thread_ts: &str, text: &str) -> Result<()> {
        self.post_json("chat.postMessage", &post_message_body(channel, thread_ts, text))
            .await?;
        debug!("posted thread reply");
        Ok(())
    }

    #[instrument(skip(self), fields(channel = %channel))]
    async fn thread_replies(&self, channel: &str, thread_ts: &str) -> Result<Vec<ThreadMessage>> {
        let limit = THREAD_FETCH_LIMIT.to_string();
        let mut body = self
            .get_query(
                "conversations.replies",
                &[
                    ("channel", channel),
                    ("ts", thread_ts),
                    ("inclusive", "true"),
                    ("limit", &limit),
                ],
            )
            .await?;
        let messages: Vec<ThreadMessage> = field(&mut body, "messages")?;
        debug!(count = messages.len(), "fetched thread messages");
        Ok(messages)
    }

    async fn bot_user_id(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct AuthTest {
            user_id: String,
        }
        let body = self.post_json("auth.test", &json!({})).await?;
        let auth: AuthTest =
            serde_json::from_value(body).map_err(|e| SlackError::Parse(e.to_string()))?;
        Ok(auth.user_id)
    }

    async fn user_info(&self, user_id: &str) -> Result<UserInfo> {
        let mut body = self.get_query("users.info", &[("user", user_id)]).await?;
        field(&mut body, "user").inspect_err(|e| warn!(user_id, error = %e, "bad users.info payload"))
    }
}
