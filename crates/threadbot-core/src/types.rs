use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ThreadbotError;

pub const URL_VERIFICATION: &str = "url_verification";
pub const EVENT_CALLBACK: &str = "event_callback";
pub const APP_MENTION: &str = "app_mention";

/// Envelope the messaging platform posts to the events route.
///
/// Unknown fields are ignored so platform additions never break intake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "type", default)]
    pub event_type: String,
    /// Present only on `url_verification` requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_app_id: Option<String>,
    /// Platform-assigned, stable across retried deliveries of the same event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<i64>,
    #[serde(rename = "event", default, skip_serializing_if = "Option::is_none")]
    pub mention: Option<Mention>,
}

/// Kind of envelope, derived from its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    UrlVerification,
    EventCallback,
    Other,
}

impl InboundEvent {
    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            URL_VERIFICATION => EventKind::UrlVerification,
            EVENT_CALLBACK => EventKind::EventCallback,
            _ => EventKind::Other,
        }
    }

    /// The embedded mention, if this envelope carries one the bot should act on.
    pub fn actionable_mention(&self) -> Option<&Mention> {
        if self.kind() != EventKind::EventCallback {
            return None;
        }
        self.mention.as_ref().filter(|m| m.is_actionable())
    }
}

/// The inner `event` object of an `event_callback` envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(rename = "channel", default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Timestamp of the mention message itself.
    #[serde(rename = "ts", default, skip_serializing_if = "Option::is_none")]
    pub message_ts: Option<String>,
    /// Root of the thread; `None` for top-level messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<String>,
    /// Rich-text blocks, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<serde_json::Value>,
}

impl Mention {
    /// An `app_mention` posted inside a thread.
    pub fn is_actionable(&self) -> bool {
        self.event_type == APP_MENTION && self.thread_ts.is_some()
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Processing status stored on a dedup record.
///
/// Transitions: `Processing -> Completed | Error`. Both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Processing,
    Completed,
    Error,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Processing => "processing",
            EventStatus::Completed => "completed",
            EventStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, EventStatus::Processing)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = ThreadbotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(EventStatus::Processing),
            "completed" => Ok(EventStatus::Completed),
            "error" => Ok(EventStatus::Error),
            other => Err(ThreadbotError::InvalidStatus(other.to_string())),
        }
    }
}

/// Persisted row that gates processing of one event id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupRecord {
    pub event_id: String,
    /// Epoch seconds at claim time.
    pub processed_at: i64,
    /// Epoch seconds after which the store may reclaim the row.
    pub ttl: i64,
    pub status: EventStatus,
}

impl DedupRecord {
    /// A fresh `processing` record claimed at `now`.
    pub fn claim(event_id: impl Into<String>, now: i64, ttl_secs: i64) -> Self {
        Self {
            event_id: event_id.into(),
            processed_at: now,
            ttl: now + ttl_secs,
            status: EventStatus::Processing,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.ttl <= now
    }
}

/// What the worker side should do with a dispatched task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    ProcessMention,
    #[serde(other)]
    Unknown,
}

/// The only message passed from intake to the workflow. It may cross a
/// process boundary, so it carries the full inbound envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchPayload {
    pub action: TaskAction,
    pub event: InboundEvent,
}

impl DispatchPayload {
    pub fn process_mention(event: InboundEvent) -> Self {
        Self {
            action: TaskAction::ProcessMention,
            event,
        }
    }

    pub fn event_id(&self) -> Option<&str> {
        self.event.event_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for s in [
            EventStatus::Processing,
            EventStatus::Completed,
            EventStatus::Error,
        ] {
            assert_eq!(s.as_str().parse::<EventStatus>().unwrap(), s);
        }
        assert!("done".parse::<EventStatus>().is_err());
    }

    #[test]
    fn only_processing_is_non_terminal() {
        assert!(!EventStatus::Processing.is_terminal());
        assert!(EventStatus::Completed.is_terminal());
        assert!(EventStatus::Error.is_terminal());
    }

    #[test]
    fn claim_record_expires_after_ttl() {
        let rec = DedupRecord::claim("Ev1", 1_000, 300);
        assert_eq!(rec.ttl, 1_300);
        assert_eq!(rec.status, EventStatus::Processing);
        assert!(!rec.is_expired(1_299));
        assert!(rec.is_expired(1_300));
    }

    #[test]
    fn mention_outside_thread_is_not_actionable() {
        let mention = Mention {
            event_type: APP_MENTION.to_string(),
            thread_ts: None,
            ..Default::default()
        };
        assert!(!mention.is_actionable());
    }

    #[test]
    fn non_mention_event_is_not_actionable() {
        let event = InboundEvent {
            event_type: EVENT_CALLBACK.to_string(),
            mention: Some(Mention {
                event_type: "message".to_string(),
                thread_ts: Some("1.0".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(event.actionable_mention().is_none());
    }
}
