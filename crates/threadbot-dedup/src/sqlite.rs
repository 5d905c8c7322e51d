use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::Connection;
use threadbot_core::{DedupRecord, EventStatus};
use tracing::{debug, instrument};

use crate::error::{DedupError, Result};
use crate::store::{DedupStore, InsertOutcome};

/// Dedup store backed by a single SQLite connection.
///
/// The primary key on `event_id` plus `INSERT OR IGNORE` gives the
/// conditional insert; SQLite serialises writers, so concurrent claims for
/// the same id see exactly one changed row between them. Expiry is emulated
/// by `purge_expired`, which the gateway runs on an interval.
pub struct SqliteDedupStore {
    db: Mutex<Connection>,
}

impl SqliteDedupStore {
    /// Wrap an already-open connection, creating the table if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        crate::db::init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Private in-memory database, for tests and throwaway runs.
    pub fn in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock only means another thread panicked mid-statement;
        // SQLite itself rolled that statement back.
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Delete every record whose `ttl` is at or before `now`.
    #[instrument(skip(self))]
    pub fn purge_expired(&self, now: i64) -> Result<usize> {
        let removed = self.conn().execute(
            "DELETE FROM dedup_events WHERE ttl <= ?1",
            rusqlite::params![now],
        )?;
        if removed > 0 {
            debug!(removed, "purged expired dedup records");
        }
        Ok(removed)
    }
}

#[async_trait]
impl DedupStore for SqliteDedupStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    #[instrument(skip(self, record), fields(event_id = %record.event_id))]
    async fn insert_if_absent(&self, record: &DedupRecord) -> Result<InsertOutcome> {
        let changed = self.conn().execute(
            "INSERT OR IGNORE INTO dedup_events (event_id, processed_at, ttl, status)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                record.event_id,
                record.processed_at,
                record.ttl,
                record.status.as_str()
            ],
        )?;
        Ok(if changed == 1 {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::AlreadyExists
        })
    }

    #[instrument(skip(self))]
    async fn update_status(&self, event_id: &str, status: EventStatus) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE dedup_events SET status = ?1 WHERE event_id = ?2",
            rusqlite::params![status.as_str(), event_id],
        )?;
        if changed == 0 {
            return Err(DedupError::NotFound {
                event_id: event_id.to_string(),
            });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, event_id: &str) -> Result<Option<DedupRecord>> {
        let db = self.conn();
        let row = db.query_row(
            "SELECT event_id, processed_at, ttl, status
             FROM dedup_events WHERE event_id = ?1",
            rusqlite::params![event_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        );
        match row {
            Ok((event_id, processed_at, ttl, status)) => Ok(Some(DedupRecord {
                event_id,
                processed_at,
                ttl,
                status: status
                    .parse()
                    .map_err(|e: threadbot_core::ThreadbotError| DedupError::Malformed(e.to_string()))?,
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DedupError::Database(e)),
        }
    }
}
