//! Domain records of a band's planning data.
//!
//! # Responsibility
//! - Define the records stored in selections: members, venues, songs,
//!   appointments and ledger entries.
//! - Provide the parametrized selectors for each record family.
//!
//! # Invariants
//! - Members and appointments carry a stable UUID.
//! - Records validate their input on construction and never hold negative money.
//!
//! # See also
//! - `selection` for the collections these records live in.

pub mod appointment;
pub mod interval_set;
pub mod ledger;
pub mod member;
pub mod notice;
pub mod song;
pub mod validation;
pub mod venue;
