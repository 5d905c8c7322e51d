//! Reaction-based progress marker on the mention message.
//!
//! ⏳ is added when work starts and removed once the reply (or apology) is
//! out. Both calls are best-effort: failures are logged and never surface.

use threadbot_slack::SlackApi;
use tracing::warn;

pub const THINKING: &str = "hourglass_flowing_sand";

/// Handle that manages the thinking reaction on a single message.
pub struct ThinkingIndicator<'a> {
    slack: &'a dyn SlackApi,
    channel: &'a str,
    ts: &'a str,
    shown: bool,
}

impl<'a> ThinkingIndicator<'a> {
    pub fn new(slack: &'a dyn SlackApi, channel: &'a str, ts: &'a str) -> Self {
        Self {
            slack,
            channel,
            ts,
            shown: false,
        }
    }

    pub async fn show(&mut self) {
        match self.slack.add_reaction(self.channel, self.ts, THINKING).await {
            Ok(()) => self.shown = true,
            Err(e) => warn!(channel = self.channel, error = %e, "failed to add thinking reaction"),
        }
    }

    /// Remove the reaction. Attempted even if `show` failed, since the add
    /// may have landed despite the error.
    pub async fn clear(&mut self) {
        if let Err(e) = self.slack.remove_reaction(self.channel, self.ts, THINKING).await {
            warn!(channel = self.channel, error = %e, "failed to remove thinking reaction");
        }
        self.shown = false;
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingSlack};

    #[tokio::test]
    async fn show_then_clear_adds_and_removes() {
        let slack = RecordingSlack::default();
        let mut ack = ThinkingIndicator::new(&slack, "C1", "100.2");

        ack.show().await;
        assert!(ack.is_shown());
        ack.clear().await;
        assert!(!ack.is_shown());

        assert_eq!(
            slack.calls(),
            vec![
                Call::AddReaction("C1".into(), "100.2".into(), THINKING.into()),
                Call::RemoveReaction("C1".into(), "100.2".into(), THINKING.into()),
            ]
        );
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let slack = RecordingSlack {
            fail_reactions: true,
            ..Default::default()
        };
        let mut ack = ThinkingIndicator::new(&slack, "C1", "100.2");

        ack.show().await;
        assert!(!ack.is_shown());
        ack.clear().await;
        assert_eq!(slack.calls().len(), 2);
    }
}
