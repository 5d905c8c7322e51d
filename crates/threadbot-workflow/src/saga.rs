//! The mention workflow: one claimed mention in, one thread reply out.
//!
//! Steps run strictly in sequence. A failure in any step switches to the
//! compensation path (apology + indicator removal, each best-effort), and
//! the dedup record always ends in a terminal status.

use std::sync::Arc;

use threadbot_core::config::ModelConfig;
use threadbot_core::{EventStatus, InboundEvent};
use threadbot_dedup::DeduplicationGate;
use threadbot_llm::{ChatRequest, LlmProvider, Message};
use threadbot_slack::mention::extract_intent;
use threadbot_slack::thread::format_thread_for_model;
use threadbot_slack::{SlackApi, UserDirectory};
use tracing::{debug, error, info, instrument, warn};

use crate::ack::ThinkingIndicator;
use crate::commands::{Command, HELP_TEXT};
use crate::error::{Result, WorkflowError};
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::reply::{
    format_for_slack, truncate_for_slack, APOLOGY, EMPTY_RESPONSE, MODEL_ERROR_RESPONSE,
};

pub struct MentionWorkflow {
    slack: Arc<dyn SlackApi>,
    directory: Arc<UserDirectory>,
    llm: Arc<dyn LlmProvider>,
    gate: DeduplicationGate,
    model: ModelConfig,
}

/// Where the mention lives, borrowed from the dispatched event.
struct Target<'a> {
    channel: &'a str,
    message_ts: &'a str,
    thread_ts: &'a str,
    text: &'a str,
}

impl<'a> Target<'a> {
    fn from_event(event: &'a InboundEvent) -> Result<Self> {
        let mention = event
            .mention
            .as_ref()
            .ok_or(WorkflowError::MissingField("event"))?;
        Ok(Self {
            channel: mention
                .channel_id
                .as_deref()
                .ok_or(WorkflowError::MissingField("channel"))?,
            message_ts: mention
                .message_ts
                .as_deref()
                .ok_or(WorkflowError::MissingField("ts"))?,
            thread_ts: mention
                .thread_ts
                .as_deref()
                .ok_or(WorkflowError::MissingField("thread_ts"))?,
            text: mention.text(),
        })
    }
}

impl MentionWorkflow {
    /// `directory` is the display-name cache shared by every mention this
    /// workflow handles; it lives as long as the process.
    pub fn new(
        slack: Arc<dyn SlackApi>,
        directory: Arc<UserDirectory>,
        llm: Arc<dyn LlmProvider>,
        gate: DeduplicationGate,
        model: ModelConfig,
    ) -> Self {
        Self {
            slack,
            directory,
            llm,
            gate,
            model,
        }
    }

    pub fn gate(&self) -> &DeduplicationGate {
        &self.gate
    }

    /// Run the workflow for one claimed event and record its outcome.
    ///
    /// Never fails: the returned status is the one written to the dedup record.
    #[instrument(skip_all, fields(event_id = event.event_id.as_deref().unwrap_or("")))]
    pub async fn process(&self, event: &InboundEvent) -> EventStatus {
        let status = match Target::from_event(event) {
            Ok(target) => self.run_with_compensation(&target).await,
            Err(e) => {
                error!(error = %e, "cannot process mention");
                EventStatus::Error
            }
        };

        match event.event_id.as_deref() {
            Some(event_id) => self.gate.set_status(event_id, status).await,
            None => warn!(status = %status, "event has no id; outcome not recorded"),
        }
        info!(status = %status, "mention processed");
        status
    }

    async fn run_with_compensation(&self, target: &Target<'_>) -> EventStatus {
        let mut ack = ThinkingIndicator::new(self.slack.as_ref(), target.channel, target.message_ts);
        match self.run(target, &mut ack).await {
            Ok(()) => EventStatus::Completed,
            Err(e) => {
                error!(channel = target.channel, thread_ts = target.thread_ts, error = %e, "mention workflow failed");
                if let Err(e) = self
                    .slack
                    .post_message(target.channel, target.thread_ts, APOLOGY)
                    .await
                {
                    warn!(error = %e, "failed to post apology");
                }
                ack.clear().await;
                EventStatus::Error
            }
        }
    }

    async fn run(&self, target: &Target<'_>, ack: &mut ThinkingIndicator<'_>) -> Result<()> {
        ack.show().await;

        let bot_id = match self.slack.bot_user_id().await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "could not resolve bot user id");
                None
            }
        };

        let messages = self
            .slack
            .thread_replies(target.channel, target.thread_ts)
            .await?;

        let intent = extract_intent(target.text, bot_id.as_deref(), &self.directory).await;
        let command = Command::parse(&intent);
        debug!(?command, intent = %intent, "parsed mention");

        let reply = if command.needs_model() {
            let context = format_thread_for_model(
                &messages,
                bot_id.as_deref(),
                Some(target.message_ts),
                &self.directory,
            )
            .await;
            self.generate(command, &context, &intent).await
        } else {
            HELP_TEXT.to_string()
        };

        self.slack
            .post_message(target.channel, target.thread_ts, &truncate_for_slack(&reply))
            .await?;

        ack.clear().await;
        Ok(())
    }

    /// Ask the model. Any failure becomes a fixed fallback reply.
    async fn generate(&self, command: Command, context: &str, question: &str) -> String {
        let req = ChatRequest {
            model: self.model.model_id.clone(),
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message::user(build_prompt(command, context, question))],
            max_tokens: self.model.max_tokens,
            temperature: self.model.temperature,
        };

        match self.llm.send(&req).await {
            Ok(resp) if resp.content.trim().is_empty() => {
                warn!(provider = self.llm.name(), "model returned no text");
                EMPTY_RESPONSE.to_string()
            }
            Ok(resp) => {
                debug!(
                    provider = self.llm.name(),
                    tokens_in = resp.tokens_in,
                    tokens_out = resp.tokens_out,
                    "model replied"
                );
                format_for_slack(&resp.content)
            }
            Err(e) => {
                warn!(provider = self.llm.name(), error = %e, "model call failed");
                MODEL_ERROR_RESPONSE.to_string()
            }
        }
    }
}
