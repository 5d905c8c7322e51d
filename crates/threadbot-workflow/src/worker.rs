//! Worker-side entry point for dispatched tasks.

use threadbot_core::{DispatchPayload, EventStatus, TaskAction};
use tracing::{info, warn};

use crate::saga::MentionWorkflow;

impl MentionWorkflow {
    /// Execute one dispatched task.
    ///
    /// Returns `None` when nothing ran: unknown actions, and redeliveries
    /// whose dedup record is already terminal. A missing or unreadable record
    /// does not block processing.
    pub async fn handle_task(&self, payload: &DispatchPayload) -> Option<EventStatus> {
        match payload.action {
            TaskAction::ProcessMention => {}
            TaskAction::Unknown => {
                warn!(event_id = payload.event_id().unwrap_or(""), "ignoring task with unknown action");
                return None;
            }
        }

        if let Some(event_id) = payload.event_id() {
            if let Some(status) = self.gate().status(event_id).await {
                if status.is_terminal() {
                    info!(event_id, status = %status, "task already finished, skipping redelivery");
                    return None;
                }
            }
        }

        Some(self.process(&payload.event).await)
    }
}
