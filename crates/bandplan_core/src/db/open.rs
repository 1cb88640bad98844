//! Connection bootstrap utilities for snapshot files.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure the busy timeout used while another process holds the file.
//! - Create the snapshot table before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have the snapshot table in place.

use super::schema::ensure_schema;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT_SECS: u64 = 5;

/// Opens (or creates) a snapshot database file.
///
/// # Side effects
/// - Creates the snapshot table when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_logged("file", || Connection::open(path))
}

/// Opens an in-memory snapshot database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged("memory", Connection::open_in_memory)
}

/// Runs `connect`, prepares the connection and logs one `db_open` outcome
/// tagged with `mode`.
fn open_logged(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let outcome = connect()
        .map_err(|err| ("db_open_failed", DbError::from(err)))
        .and_then(|conn| {
            prepare(&conn)
                .map(|()| conn)
                .map_err(|err| ("db_bootstrap_failed", err))
        });
    let elapsed_ms = started_at.elapsed().as_millis();

    match outcome {
        Ok(conn) => {
            info!("event=db_open module=db status=ok mode={mode} duration_ms={elapsed_ms}");
            Ok(conn)
        }
        Err((code, err)) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={elapsed_ms} error_code={code} error={err}"
            );
            Err(err)
        }
    }
}

fn prepare(conn: &Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS))?;
    ensure_schema(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{open_db, open_db_in_memory};
    use crate::db::DbError;
    use crate::db::schema::SNAPSHOT_TABLE;

    fn has_snapshot_table(conn: &rusqlite::Connection) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [SNAPSHOT_TABLE],
            |row| row.get::<_, i64>(0),
        )
        .expect("query sqlite_master")
            == 1
    }

    #[test]
    fn in_memory_connection_is_bootstrapped() {
        let conn = open_db_in_memory().expect("open in-memory db");
        assert!(has_snapshot_table(&conn));
    }

    #[test]
    fn file_connection_creates_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bands.db");
        let conn = open_db(&path).expect("open file db");
        assert!(path.exists());
        assert!(has_snapshot_table(&conn));
    }

    #[test]
    fn file_in_missing_directory_fails_to_open() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing").join("bands.db");
        assert!(matches!(open_db(&path), Err(DbError::Sqlite(_))));
        assert!(!path.exists());
    }
}
