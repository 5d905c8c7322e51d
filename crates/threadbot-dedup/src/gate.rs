use std::sync::Arc;

use threadbot_core::{DedupRecord, EventStatus};
use tracing::{debug, info, warn};

use crate::store::{DedupStore, InsertOutcome};

/// At-most-once admission for event ids.
///
/// Wraps a [`DedupStore`] and turns its outcomes into the decisions intake
/// and the worker need. Store failures never propagate: a claim that cannot
/// be confirmed is treated as not claimed, and status writes are best-effort.
#[derive(Clone)]
pub struct DeduplicationGate {
    store: Arc<dyn DedupStore>,
    ttl_secs: i64,
}

impl DeduplicationGate {
    pub fn new(store: Arc<dyn DedupStore>, ttl_secs: i64) -> Self {
        Self { store, ttl_secs }
    }

    pub fn backend(&self) -> &str {
        self.store.name()
    }

    /// Try to claim `event_id`. Returns `true` only for the first caller.
    ///
    /// A missing or empty id is never claimable.
    pub async fn claim(&self, event_id: Option<&str>) -> bool {
        let Some(event_id) = event_id.filter(|id| !id.is_empty()) else {
            warn!("event without an event_id; refusing to claim");
            return false;
        };

        let record = DedupRecord::claim(event_id, chrono::Utc::now().timestamp(), self.ttl_secs);
        match self.store.insert_if_absent(&record).await {
            Ok(InsertOutcome::Inserted) => {
                debug!(event_id, "claimed event");
                true
            }
            Ok(InsertOutcome::AlreadyExists) => {
                info!(event_id, "duplicate event, already claimed");
                false
            }
            Err(e) => {
                warn!(event_id, backend = self.store.name(), error = %e, "dedup claim failed");
                false
            }
        }
    }

    /// Record the outcome for `event_id`. Failures are logged and dropped.
    pub async fn set_status(&self, event_id: &str, status: EventStatus) {
        if let Err(e) = self.store.update_status(event_id, status).await {
            warn!(event_id, status = %status, error = %e, "failed to update dedup status");
        }
    }

    /// Current status of `event_id`, or `None` when missing or unreadable.
    pub async fn status(&self, event_id: &str) -> Option<EventStatus> {
        match self.store.get(event_id).await {
            Ok(record) => record.map(|r| r.status),
            Err(e) => {
                warn!(event_id, error = %e, "failed to read dedup status");
                None
            }
        }
    }
}
