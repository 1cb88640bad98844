//! Core planning logic for bands: members, repertoire, venues, appointments
//! agreed by consensus, and profit/loss.
//!
//! Every record family lives in a [`selection::Selection`], a lazily
//! filtered view over a shared backing store from which removed elements
//! can be restored.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod selection;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::appointment::{
    Appointment, AppointmentKind, AppointmentKindSelector, AppointmentPeriodSelector,
    ParticipantSelector,
};
pub use model::interval_set::{Instant, IntervalSet};
pub use model::ledger::{EntryPeriodSelector, Ledger, LedgerEntry};
pub use model::member::{
    InstrumentSelector, Member, MemberAvailabilitySelector, MemberId, MemberNameSelector, Members,
    SubstituteSelector,
};
pub use model::notice::{ChangedField, Notice};
pub use model::song::{
    Song, SongAvailabilitySelector, SongNameSelector, SongVariant, Songs, Variant,
    VariantLabelSelector,
};
pub use model::validation::ValidationError;
pub use model::venue::{FacilitySelector, Venue, VenueNameSelector, Venues};
pub use repo::snapshot_repo::{RepoError, RepoResult, SnapshotRepository, SqliteSnapshotRepository};
pub use schedule::appointments::Appointments;
pub use schedule::eligibility::AttendancePolicy;
pub use schedule::proposal::{Proposal, ProposalState};
pub use schedule::{ScheduleError, ScheduleResult};
pub use selection::{
    shared, Cursor, Selection, SelectionError, SelectionResult, Selector, SharedSelector,
};
pub use service::band::Band;
pub use service::profit_loss::ProfitLoss;
pub use service::program::{Program, ProgramError};
pub use service::snapshot::{BandSnapshot, ProgramSnapshot, SnapshotError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
