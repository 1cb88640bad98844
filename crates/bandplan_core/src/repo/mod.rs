//! Repository layer for snapshot persistence.
//!
//! # Responsibility
//! - Define the storage contract for program snapshots.
//! - Isolate SQLite and JSON details from band and program logic.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`InvalidData`) in addition to DB
//!   transport errors.

pub mod snapshot_repo;
