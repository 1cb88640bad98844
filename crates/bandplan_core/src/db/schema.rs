//! Snapshot table definition.
//!
//! The table holds at most one row (`id = 1`) carrying the whole program
//! snapshot as JSON text.

use crate::db::DbResult;
use rusqlite::Connection;

pub const SNAPSHOT_TABLE: &str = "program_snapshot";

const CREATE_SNAPSHOT_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS program_snapshot (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    payload TEXT NOT NULL,
    saved_at TEXT NOT NULL
);";

/// Creates the snapshot table when it is missing.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CREATE_SNAPSHOT_TABLE_SQL)?;
    Ok(())
}
