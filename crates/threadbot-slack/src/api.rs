use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ThreadMessage, UserInfo};

/// The Slack operations the mention workflow needs.
///
/// `SlackClient` talks to the real Web API; tests substitute recording fakes.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// `reactions.add` on the message at `ts`.
    async fn add_reaction(&self, channel: &str, ts: &str, name: &str) -> Result<()>;

    /// `reactions.remove` on the message at `ts`.
    async fn remove_reaction(&self, channel: &str, ts: &str, name: &str) -> Result<()>;

    /// `chat.postMessage` as a reply in the thread rooted at `thread_ts`.
    async fn post_message(&self, channel: &str, thread_ts: &str, text: &str) -> Result<()>;

    /// `conversations.replies`, oldest first, root message included.
    async fn thread_replies(&self, channel: &str, thread_ts: &str) -> Result<Vec<ThreadMessage>>;

    /// The bot's own user id, from `auth.test`.
    async fn bot_user_id(&self) -> Result<String>;

    /// `users.info` for one user.
    async fn user_info(&self, user_id: &str) -> Result<UserInfo>;
}
