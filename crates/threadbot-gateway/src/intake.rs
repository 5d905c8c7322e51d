//! The synchronous front door for platform events.
//!
//! At most one dedup-store round trip per request and no calls to Slack or
//! the model: the platform expects an answer within a few seconds.

use std::sync::Arc;

use threadbot_core::types::EventKind;
use threadbot_core::{DispatchPayload, InboundEvent};
use threadbot_dedup::DeduplicationGate;
use tracing::{error, info, warn};

use crate::dispatch::TaskDispatcher;
use crate::signature::SignatureVerifier;

/// Outcome of one intake request, independent of the HTTP framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeResponse {
    /// Echo of a `url_verification` challenge.
    Challenge(String),
    /// Accepted, duplicate, or ignored.
    Ok,
    Unauthorized,
    InternalError,
}

impl IntakeResponse {
    pub fn status(&self) -> u16 {
        match self {
            IntakeResponse::Challenge(_) | IntakeResponse::Ok => 200,
            IntakeResponse::Unauthorized => 401,
            IntakeResponse::InternalError => 500,
        }
    }

    pub fn body(&self) -> String {
        match self {
            IntakeResponse::Challenge(challenge) => {
                serde_json::json!({ "challenge": challenge }).to_string()
            }
            IntakeResponse::Ok => "OK".to_string(),
            IntakeResponse::Unauthorized => "Unauthorized".to_string(),
            IntakeResponse::InternalError => "Internal Server Error".to_string(),
        }
    }
}

pub struct IntakeDispatcher {
    verifier: Option<SignatureVerifier>,
    gate: DeduplicationGate,
    dispatcher: Arc<dyn TaskDispatcher>,
}

impl IntakeDispatcher {
    /// `verifier = None` accepts unsigned requests (local development only).
    pub fn new(
        verifier: Option<SignatureVerifier>,
        gate: DeduplicationGate,
        dispatcher: Arc<dyn TaskDispatcher>,
    ) -> Self {
        Self {
            verifier,
            gate,
            dispatcher,
        }
    }

    pub fn gate(&self) -> &DeduplicationGate {
        &self.gate
    }

    pub async fn handle(
        &self,
        signature: Option<&str>,
        timestamp: Option<&str>,
        body: &[u8],
    ) -> IntakeResponse {
        let event: InboundEvent = match serde_json::from_slice(body) {
            Ok(event) => event,
            Err(e) => {
                error!(error = %e, bytes = body.len(), "unparsable event body");
                return IntakeResponse::InternalError;
            }
        };

        // Slack does not sign verification challenges.
        if event.kind() == EventKind::UrlVerification {
            info!("answering url_verification challenge");
            return IntakeResponse::Challenge(event.challenge.unwrap_or_default());
        }

        if let Some(ref verifier) = self.verifier {
            if !verifier.verify(signature, timestamp, body) {
                warn!(event_id = event.event_id.as_deref().unwrap_or(""), "rejecting unsigned or stale request");
                return IntakeResponse::Unauthorized;
            }
        }

        if let Some(mention) = event.actionable_mention() {
            let event_id = event.event_id.as_deref();
            if self.gate.claim(event_id).await {
                info!(
                    event_id = event_id.unwrap_or(""),
                    channel = mention.channel_id.as_deref().unwrap_or(""),
                    thread_ts = mention.thread_ts.as_deref().unwrap_or(""),
                    "dispatching mention"
                );
                // A failed handoff leaves the claim in place until its TTL lapses.
                let payload = DispatchPayload::process_mention(event.clone());
                if let Err(e) = self.dispatcher.dispatch(&payload).await {
                    error!(
                        event_id = event_id.unwrap_or(""),
                        dispatcher = self.dispatcher.name(),
                        error = %e,
                        "task dispatch failed"
                    );
                }
            }
        }

        IntakeResponse::Ok
    }
}
