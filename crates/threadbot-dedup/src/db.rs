use rusqlite::Connection;

use crate::error::Result;

/// Initialise the dedup table and its expiry index.
///
/// Safe to call on every startup: uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS dedup_events (
            event_id      TEXT PRIMARY KEY,
            processed_at  INTEGER NOT NULL,
            ttl           INTEGER NOT NULL,
            status        TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_dedup_events_ttl
            ON dedup_events(ttl);",
    )?;
    Ok(())
}
