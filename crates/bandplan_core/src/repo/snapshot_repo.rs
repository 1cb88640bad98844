//! Snapshot repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Store and load the whole program snapshot as one JSON payload.
//! - Keep SQL and JSON encoding details inside the persistence boundary.
//!
//! # Invariants
//! - `save` replaces the previous snapshot atomically.
//! - `load` rejects payloads that do not decode instead of masking them.

use crate::db::DbError;
use crate::service::snapshot::ProgramSnapshot;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Encode(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage for the single program snapshot.
pub trait SnapshotRepository {
    fn save(&self, snapshot: &ProgramSnapshot) -> RepoResult<()>;
    /// Returns `None` when nothing was saved yet.
    fn load(&self) -> RepoResult<Option<ProgramSnapshot>>;
}

/// SQLite-backed snapshot repository.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn save(&self, snapshot: &ProgramSnapshot) -> RepoResult<()> {
        let payload = serde_json::to_string(snapshot).map_err(RepoError::Encode)?;
        self.conn.execute(
            "INSERT INTO program_snapshot (id, payload, saved_at)
             VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at;",
            params![payload, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn load(&self) -> RepoResult<Option<ProgramSnapshot>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM program_snapshot WHERE id = 1;",
                [],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|payload| {
                serde_json::from_str(&payload)
                    .map_err(|err| RepoError::InvalidData(err.to_string()))
            })
            .transpose()
    }
}
