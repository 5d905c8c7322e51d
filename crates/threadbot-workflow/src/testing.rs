//! Hand-written fakes for the Slack and model capabilities.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use threadbot_llm::{ChatRequest, ChatResponse, LlmProvider, ProviderError};
use threadbot_slack::{Result, SlackApi, SlackError, ThreadMessage, UserInfo, UserProfile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AddReaction(String, String, String),
    RemoveReaction(String, String, String),
    PostMessage(String, String, String),
    ThreadReplies(String, String),
    AuthTest,
    UserInfo(String),
}

fn api_error(method: &str) -> SlackError {
    SlackError::Api {
        method: method.to_string(),
        error: "fake_failure".to_string(),
    }
}

/// Records every call in order; failures are switched on per operation.
#[derive(Default)]
pub struct RecordingSlack {
    pub calls: Mutex<Vec<Call>>,
    pub thread: Vec<ThreadMessage>,
    pub users: HashMap<String, String>,
    pub bot_id: Option<String>,
    pub fail_reactions: bool,
    pub fail_post: bool,
    pub fail_thread: bool,
}

impl RecordingSlack {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::PostMessage(_, _, text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SlackApi for RecordingSlack {
    async fn add_reaction(&self, channel: &str, ts: &str, name: &str) -> Result<()> {
        self.record(Call::AddReaction(channel.into(), ts.into(), name.into()));
        if self.fail_reactions {
            return Err(api_error("reactions.add"));
        }
        Ok(())
    }

    async fn remove_reaction(&self, channel: &str, ts: &str, name: &str) -> Result<()> {
        self.record(Call::RemoveReaction(channel.into(), ts.into(), name.into()));
        if self.fail_reactions {
            return Err(api_error("reactions.remove"));
        }
        Ok(())
    }

    async fn post_message(&self, channel: &str, thread_ts: &str, text: &str) -> Result<()> {
        self.record(Call::PostMessage(channel.into(), thread_ts.into(), text.into()));
        if self.fail_post {
            return Err(api_error("chat.postMessage"));
        }
        Ok(())
    }

    async fn thread_replies(&self, channel: &str, thread_ts: &str) -> Result<Vec<ThreadMessage>> {
        self.record(Call::ThreadReplies(channel.into(), thread_ts.into()));
        if self.fail_thread {
            return Err(api_error("conversations.replies"));
        }
        Ok(self.thread.clone())
    }

    async fn bot_user_id(&self) -> Result<String> {
        self.record(Call::AuthTest);
        self.bot_id.clone().ok_or_else(|| api_error("auth.test"))
    }

    async fn user_info(&self, user_id: &str) -> Result<UserInfo> {
        self.record(Call::UserInfo(user_id.into()));
        let name = self
            .users
            .get(user_id)
            .ok_or_else(|| api_error("users.info"))?;
        Ok(UserInfo {
            id: user_id.to_string(),
            name: None,
            profile: Some(UserProfile {
                display_name: Some(name.clone()),
                real_name: None,
            }),
        })
    }
}

/// Model fake that replays one scripted outcome and keeps the requests.
pub struct ScriptedLlm {
    pub reply: std::result::Result<String, u16>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    pub fn answering(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&self, req: &ChatRequest) -> std::result::Result<ChatResponse, ProviderError> {
        self.requests.lock().unwrap().push(req.clone());
        match &self.reply {
            Ok(text) => Ok(ChatResponse {
                content: text.clone(),
                model: req.model.clone(),
                ..Default::default()
            }),
            Err(status) => Err(ProviderError::Api {
                status: *status,
                message: "scripted failure".into(),
            }),
        }
    }
}
