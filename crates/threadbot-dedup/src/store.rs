use async_trait::async_trait;
use threadbot_core::{DedupRecord, EventStatus};

use crate::error::Result;

/// Outcome of a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// No record existed; the caller now owns the event.
    Inserted,
    /// A record with this key already exists; the caller must do nothing.
    AlreadyExists,
}

/// Key-value capability behind the dedup gate.
///
/// `insert_if_absent` is the single atomicity boundary of the pipeline:
/// implementations must guarantee that, across any number of concurrent
/// callers and processes, at most one insert per `event_id` reports
/// `Inserted`.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Insert `record` only if no record with its `event_id` exists.
    async fn insert_if_absent(&self, record: &DedupRecord) -> Result<InsertOutcome>;

    /// Overwrite the `status` of an existing record.
    async fn update_status(&self, event_id: &str, status: EventStatus) -> Result<()>;

    /// Read a record back, `None` if absent.
    async fn get(&self, event_id: &str) -> Result<Option<DedupRecord>>;
}
