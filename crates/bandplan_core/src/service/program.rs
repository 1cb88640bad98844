//! Program entry point: the list of bands and its snapshot file.
//!
//! # Responsibility
//! - Load bands from the configured snapshot file on open.
//! - Save every band back as one snapshot on quit.
//!
//! # Invariants
//! - `open` never fails: a missing file gives an empty list, a broken one
//!   gives an empty list plus an error log event.
//! - Band lookup by name ignores case; the first match wins.

use crate::config::CoreConfig;
use crate::db::{open_db, DbError};
use crate::model::validation::ValidationError;
use crate::repo::snapshot_repo::{RepoError, SnapshotRepository, SqliteSnapshotRepository};
use crate::service::band::Band;
use crate::service::snapshot::{ProgramSnapshot, SnapshotError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

#[derive(Debug)]
pub enum ProgramError {
    Db(DbError),
    Repo(RepoError),
    Snapshot(SnapshotError),
}

impl Display for ProgramError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProgramError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Snapshot(err) => Some(err),
        }
    }
}

impl From<DbError> for ProgramError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for ProgramError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SnapshotError> for ProgramError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

pub struct Program {
    config: CoreConfig,
    bands: Vec<Band>,
}

impl Program {
    /// Opens the program with the bands stored at `config.snapshot_path`.
    pub fn open(config: CoreConfig) -> Self {
        let started_at = Instant::now();
        let path = config.snapshot_path.clone();
        if !path.exists() {
            info!("event=program_open module=program status=ok source=empty reason=no_snapshot");
            return Self::empty(config);
        }

        match load_bands(&path) {
            Ok(bands) => {
                info!(
                    "event=program_open module=program status=ok source=snapshot bands={} duration_ms={}",
                    bands.len(),
                    started_at.elapsed().as_millis()
                );
                Self { config, bands }
            }
            Err(err) => {
                error!(
                    "event=program_open module=program status=error source=snapshot duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Self::empty(config)
            }
        }
    }

    /// Program without bands; nothing is read from disk.
    pub fn empty(config: CoreConfig) -> Self {
        Self {
            config,
            bands: Vec::new(),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn add_band(&mut self, band: Band) {
        self.bands.push(band);
    }

    /// Adds a band using the configured default minimum of rehearsals.
    ///
    /// # Errors
    /// - `EmptyField` when `name` is blank.
    pub fn create_band(&mut self, name: &str, style: &str) -> Result<&mut Band, ValidationError> {
        let band = Band::new(name, style, self.config.default_min_rehearsals)?;
        self.bands.push(band);
        let index = self.bands.len() - 1;
        Ok(&mut self.bands[index])
    }

    pub fn band(&self, name: &str) -> Option<&Band> {
        self.bands
            .iter()
            .find(|band| band.name().eq_ignore_ascii_case(name))
    }

    pub fn band_mut(&mut self, name: &str) -> Option<&mut Band> {
        self.bands
            .iter_mut()
            .find(|band| band.name().eq_ignore_ascii_case(name))
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Saves every band to the snapshot file.
    ///
    /// # Errors
    /// - `Db` when the file cannot be opened.
    /// - `Repo` when encoding or writing the snapshot fails.
    pub fn quit(&self) -> Result<(), ProgramError> {
        let started_at = Instant::now();
        let result = save_bands(&self.config.snapshot_path, &self.bands);
        match &result {
            Ok(()) => info!(
                "event=program_quit module=program status=ok bands={} duration_ms={}",
                self.bands.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=program_quit module=program status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

fn load_bands(path: &Path) -> Result<Vec<Band>, ProgramError> {
    let conn = open_db(path)?;
    let repo = SqliteSnapshotRepository::new(&conn);
    match repo.load()? {
        Some(snapshot) => Ok(snapshot.restore()?),
        None => Ok(Vec::new()),
    }
}

fn save_bands(path: &Path, bands: &[Band]) -> Result<(), ProgramError> {
    let conn = open_db(path)?;
    SqliteSnapshotRepository::new(&conn).save(&ProgramSnapshot::capture(bands))?;
    Ok(())
}
