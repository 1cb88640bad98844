//! One band with its repertoire, members, venues, appointments and money.
//!
//! # Responsibility
//! - Own every record collection of a band.
//! - Hand out filtered views of those collections.
//! - Run the attendance policy and open proposals for new appointments.
//!
//! # Invariants
//! - The profit/loss ledger is bound to this band's canonical appointments.
//! - `open_proposals` holds the only strong references to open proposals;
//!   member inboxes link to them weakly.

use crate::model::appointment::Appointment;
use crate::model::ledger::LedgerEntry;
use crate::model::member::{Member, Members};
use crate::model::song::{Song, Songs};
use crate::model::validation::{require_text, ValidationError};
use crate::model::venue::{Venue, Venues};
use crate::schedule::appointments::Appointments;
use crate::schedule::eligibility::AttendancePolicy;
use crate::schedule::proposal::Proposal;
use crate::schedule::{ScheduleError, ScheduleResult};
use crate::selection::{Selection, SharedSelector};
use crate::service::profit_loss::ProfitLoss;
use log::info;
use std::fmt::{Display, Formatter};

pub struct Band {
    name: String,
    style: String,
    policy: AttendancePolicy,
    repertoire: Songs,
    appointments: Appointments,
    members: Members,
    venues: Venues,
    profit_loss: ProfitLoss,
    open_proposals: Vec<Proposal>,
}

/// Collections a band is rebuilt from.
pub(crate) struct BandParts {
    pub(crate) repertoire: Songs,
    pub(crate) appointments: Appointments,
    pub(crate) members: Members,
    pub(crate) venues: Venues,
    pub(crate) ledger: Selection<LedgerEntry>,
}

impl Band {
    /// # Errors
    /// - `EmptyField` when `name` is blank.
    pub fn new(name: &str, style: &str, min_rehearsals: u32) -> Result<Self, ValidationError> {
        let appointments = Appointments::new();
        Ok(Self {
            name: require_text("band name", name)?,
            style: style.trim().to_string(),
            policy: AttendancePolicy::new(min_rehearsals),
            repertoire: Songs::new(),
            profit_loss: ProfitLoss::new(appointments.clone()),
            appointments,
            members: Members::new(),
            venues: Venues::new(),
            open_proposals: Vec::new(),
        })
    }

    pub(crate) fn from_parts(
        name: &str,
        style: &str,
        min_rehearsals: u32,
        parts: BandParts,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require_text("band name", name)?,
            style: style.trim().to_string(),
            policy: AttendancePolicy::new(min_rehearsals),
            repertoire: parts.repertoire,
            profit_loss: ProfitLoss::from_parts(parts.ledger, parts.appointments.clone()),
            appointments: parts.appointments,
            members: parts.members,
            venues: parts.venues,
            open_proposals: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn min_rehearsals(&self) -> u32 {
        self.policy.min_rehearsals()
    }

    pub fn set_min_rehearsals(&mut self, min_rehearsals: u32) {
        self.policy = AttendancePolicy::new(min_rehearsals);
    }

    pub fn repertoire(&self) -> &Songs {
        &self.repertoire
    }

    pub fn repertoire_with(&self, selectors: Vec<SharedSelector<Song>>) -> Songs {
        self.repertoire.view(selectors)
    }

    pub fn appointments(&self) -> &Appointments {
        &self.appointments
    }

    pub fn appointments_with(&self, selectors: Vec<SharedSelector<Appointment>>) -> Appointments {
        self.appointments.view(selectors)
    }

    pub fn members(&self) -> &Members {
        &self.members
    }

    pub fn members_with(&self, selectors: Vec<SharedSelector<Member>>) -> Members {
        self.members.view(selectors)
    }

    pub fn venues(&self) -> &Venues {
        &self.venues
    }

    pub fn venues_with(&self, selectors: Vec<SharedSelector<Venue>>) -> Venues {
        self.venues.view(selectors)
    }

    pub fn profit_loss(&self) -> &ProfitLoss {
        &self.profit_loss
    }

    pub fn profit_loss_with(&self, selectors: Vec<SharedSelector<LedgerEntry>>) -> ProfitLoss {
        self.profit_loss.view(selectors)
    }

    /// Proposes `appointment` to its participants.
    ///
    /// Performances are checked against the attendance policy first; a
    /// refused proposal sends no message to anybody.
    ///
    /// # Errors
    /// - `Validation(NoParticipants)` when the appointment has no participants;
    ///   add such appointments through `appointments().add`.
    /// - `BelowAttendanceThreshold` when a substitute rehearsed too little.
    pub fn propose_appointment(&mut self, appointment: Appointment) -> ScheduleResult<Proposal> {
        if appointment.participants().is_empty() {
            return Err(ScheduleError::Validation(ValidationError::NoParticipants));
        }
        self.policy.check(&appointment, &self.appointments)?;

        let participants = appointment.participants().len();
        let proposal = Proposal::open(appointment, self.appointments.clone());
        self.prune_proposals();
        self.open_proposals.push(proposal.clone());
        info!(
            "event=proposal_open module=band status=ok band={} proposal_id={} participants={}",
            self.name,
            proposal.id(),
            participants
        );
        Ok(proposal)
    }

    /// Proposals still waiting for votes, oldest first.
    pub fn open_proposals(&self) -> Vec<Proposal> {
        self.open_proposals
            .iter()
            .filter(|proposal| proposal.is_open())
            .cloned()
            .collect()
    }

    pub(crate) fn track_proposal(&mut self, proposal: Proposal) {
        self.open_proposals.push(proposal);
    }

    fn prune_proposals(&mut self) {
        self.open_proposals.retain(Proposal::is_open);
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.name, self.style)
    }
}
