// Verify inbound payloads parse the way the messaging platform sends them,
// and that the task payload survives a trip across a process boundary.

use threadbot_core::types::EventKind;
use threadbot_core::{DispatchPayload, EventStatus, InboundEvent, TaskAction};

const MENTION_EVENT: &str = r#"{
    "token": "legacy-verification-token",
    "team_id": "T111",
    "api_app_id": "A222",
    "type": "event_callback",
    "event_id": "Ev0123ABC",
    "event_time": 1700000000,
    "authorizations": [{"user_id": "UBOT"}],
    "event": {
        "type": "app_mention",
        "user": "U999",
        "text": "<@BOT123> summarize",
        "ts": "100.2",
        "thread_ts": "100.1",
        "channel": "C555",
        "event_ts": "100.2",
        "client_msg_id": "abc",
        "blocks": [{"type": "rich_text", "elements": []}]
    }
}"#;

#[test]
fn url_verification_parses_challenge() {
    let json = r#"{"token":"x","challenge":"abc123","type":"url_verification"}"#;
    let event: InboundEvent = serde_json::from_str(json).unwrap();
    assert_eq!(event.kind(), EventKind::UrlVerification);
    assert_eq!(event.challenge.as_deref(), Some("abc123"));
    assert!(event.mention.is_none());
}

#[test]
fn event_callback_with_unknown_fields_parses() {
    let event: InboundEvent = serde_json::from_str(MENTION_EVENT).unwrap();
    assert_eq!(event.kind(), EventKind::EventCallback);
    assert_eq!(event.event_id.as_deref(), Some("Ev0123ABC"));
    assert_eq!(event.event_time, Some(1_700_000_000));

    let mention = event.actionable_mention().expect("actionable mention");
    assert_eq!(mention.channel_id.as_deref(), Some("C555"));
    assert_eq!(mention.user_id.as_deref(), Some("U999"));
    assert_eq!(mention.message_ts.as_deref(), Some("100.2"));
    assert_eq!(mention.thread_ts.as_deref(), Some("100.1"));
    assert_eq!(mention.text(), "<@BOT123> summarize");
    assert_eq!(mention.blocks.len(), 1);
}

#[test]
fn top_level_mention_is_ignored() {
    let json = r#"{"type":"event_callback","event_id":"Ev1",
        "event":{"type":"app_mention","text":"hi","ts":"1.0","channel":"C1"}}"#;
    let event: InboundEvent = serde_json::from_str(json).unwrap();
    assert!(event.actionable_mention().is_none());
}

#[test]
fn dispatch_payload_wire_shape() {
    let event: InboundEvent = serde_json::from_str(MENTION_EVENT).unwrap();
    let payload = DispatchPayload::process_mention(event.clone());
    let json = serde_json::to_value(&payload).unwrap();

    assert_eq!(json["action"], "process_mention");
    assert_eq!(json["event"]["event_id"], "Ev0123ABC");
    assert_eq!(json["event"]["event"]["thread_ts"], "100.1");
    // absent optionals are omitted rather than sent as null
    assert!(json["event"].get("challenge").is_none());

    let back: DispatchPayload = serde_json::from_value(json).unwrap();
    assert_eq!(back.action, TaskAction::ProcessMention);
    assert_eq!(back.event, event);
}

#[test]
fn unknown_action_is_tolerated() {
    let json = r#"{"action":"reindex","event":{"type":"event_callback"}}"#;
    let payload: DispatchPayload = serde_json::from_str(json).unwrap();
    assert_eq!(payload.action, TaskAction::Unknown);
}

#[test]
fn status_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&EventStatus::Completed).unwrap(),
        r#""completed""#
    );
}
