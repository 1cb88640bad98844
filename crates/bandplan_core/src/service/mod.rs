//! Band-level use cases on top of the record collections.
//!
//! # Responsibility
//! - Group a band's collections and scheduling rules behind one type.
//! - Aggregate money over stand-alone entries and appointments.
//! - Load and save the program's band list through the snapshot repository.
//!
//! # See also
//! - `schedule` for proposals and the attendance rule.

pub mod band;
pub mod profit_loss;
pub mod program;
pub mod snapshot;
