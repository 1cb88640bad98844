//! Serializable snapshot of every band and its shared members.
//!
//! # Responsibility
//! - Capture bands into plain records, including removed elements, member
//!   mailboxes and open proposals.
//! - Rebuild bands so that one member id maps to one shared member handle,
//!   also across bands.
//!
//! # Invariants
//! - Selectors are never captured; restored selections start unfiltered.
//! - Members are stored once per program. Every member id referenced by a
//!   band resolves inside `ProgramSnapshot::members`, otherwise restoring fails.

use crate::model::appointment::{Appointment, AppointmentRecord};
use crate::model::ledger::LedgerEntry;
use crate::model::member::{Member, MemberId, MemberRecord};
use crate::model::song::Song;
use crate::model::validation::ValidationError;
use crate::model::venue::Venue;
use crate::schedule::appointments::Appointments;
use crate::schedule::proposal::Proposal;
use crate::selection::Selection;
use crate::service::band::{Band, BandParts};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// A stored reference names a member missing from the registry.
    UnknownMember(MemberId),
    Validation(ValidationError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMember(id) => write!(f, "snapshot references unknown member {id}"),
            Self::Validation(err) => write!(f, "invalid snapshot record: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownMember(_) => None,
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<ValidationError> for SnapshotError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Live and removed elements of one selection family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionParts<T> {
    pub live: Vec<T>,
    #[serde(default = "Vec::new")]
    pub removed: Vec<T>,
}

impl<T: Clone> SelectionParts<T> {
    fn capture(selection: &Selection<T>) -> Self {
        Self {
            live: selection.live_snapshot(),
            removed: selection.removed_snapshot(),
        }
    }

    fn into_selection(self) -> Selection<T> {
        Selection::from_parts(self.live, self.removed)
    }
}

impl<T> SelectionParts<T> {
    fn try_map<U, E>(self, mut convert: impl FnMut(T) -> Result<U, E>) -> Result<SelectionParts<U>, E> {
        Ok(SelectionParts {
            live: self.live.into_iter().map(&mut convert).collect::<Result<_, _>>()?,
            removed: self.removed.into_iter().map(&mut convert).collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: Uuid,
    pub appointment: AppointmentRecord,
    pub pending: Vec<MemberId>,
}

/// One band with every member reference stored as an id into
/// [`ProgramSnapshot::members`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSnapshot {
    pub name: String,
    pub style: String,
    pub min_rehearsals: u32,
    /// Ids of the band's member collection.
    pub roster: SelectionParts<MemberId>,
    pub repertoire: SelectionParts<Song>,
    pub venues: SelectionParts<Venue>,
    pub appointments: SelectionParts<AppointmentRecord>,
    pub ledger: SelectionParts<LedgerEntry>,
    #[serde(default)]
    pub proposals: Vec<ProposalRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramSnapshot {
    /// Every member referenced by any band, once each.
    #[serde(default)]
    pub members: Vec<MemberRecord>,
    pub bands: Vec<BandSnapshot>,
}

impl ProgramSnapshot {
    pub fn capture(bands: &[Band]) -> Self {
        let mut registry = MemberRegistry::default();
        let bands = bands
            .iter()
            .map(|band| BandSnapshot::capture(band, &mut registry))
            .collect();
        Self {
            members: registry.records,
            bands,
        }
    }

    /// Rebuilds every band; a member shared by several bands comes back as
    /// one handle.
    ///
    /// # Errors
    /// - `UnknownMember` when a band references an id missing from `members`.
    /// - `Validation` from the first record that fails to rebuild.
    pub fn restore(self) -> SnapshotResult<Vec<Band>> {
        let mut members = HashMap::with_capacity(self.members.len());
        for record in self.members {
            let member = Member::from_record(record)?;
            members.insert(member.id(), member);
        }
        self.bands
            .into_iter()
            .map(|band| band.restore(&members))
            .collect()
    }
}

impl BandSnapshot {
    fn capture(band: &Band, registry: &mut MemberRegistry) -> Self {
        let roster = SelectionParts::capture(band.members());
        let appointments = SelectionParts::capture(band.appointments().selection());
        let proposals = band.open_proposals();

        roster.live.iter().chain(&roster.removed).for_each(|m| registry.insert(m));
        appointments
            .live
            .iter()
            .chain(&appointments.removed)
            .flat_map(Appointment::participants)
            .for_each(|m| registry.insert(m));
        for proposal in &proposals {
            proposal
                .appointment()
                .participants()
                .iter()
                .for_each(|m| registry.insert(m));
        }

        Self {
            name: band.name().to_string(),
            style: band.style().to_string(),
            min_rehearsals: band.min_rehearsals(),
            roster: SelectionParts {
                live: roster.live.iter().map(Member::id).collect(),
                removed: roster.removed.iter().map(Member::id).collect(),
            },
            repertoire: SelectionParts::capture(band.repertoire()),
            venues: SelectionParts::capture(band.venues()),
            appointments: SelectionParts {
                live: appointments.live.iter().map(Appointment::to_record).collect(),
                removed: appointments.removed.iter().map(Appointment::to_record).collect(),
            },
            ledger: SelectionParts::capture(band.profit_loss().entries()),
            proposals: proposals
                .iter()
                .map(|proposal| ProposalRecord {
                    id: proposal.id(),
                    appointment: proposal.appointment().to_record(),
                    pending: proposal.pending().iter().map(Member::id).collect(),
                })
                .collect(),
        }
    }

    /// Rebuilds the band against the program-wide member handles, relinking
    /// open proposals into the inboxes of their pending members.
    fn restore(self, members: &HashMap<MemberId, Member>) -> SnapshotResult<Band> {
        let lookup = |id: MemberId| {
            members
                .get(&id)
                .cloned()
                .ok_or(SnapshotError::UnknownMember(id))
        };
        let resolve_appointment = |record: AppointmentRecord| -> SnapshotResult<Appointment> {
            let participants = record
                .participants
                .iter()
                .map(|id| lookup(*id))
                .collect::<SnapshotResult<Vec<_>>>()?;
            Ok(Appointment::from_record(record, participants)?)
        };

        let roster = self.roster.try_map(&lookup)?;
        let appointments = Appointments::from_selection(
            self.appointments.try_map(&resolve_appointment)?.into_selection(),
        );

        let mut proposals = Vec::with_capacity(self.proposals.len());
        for record in self.proposals {
            let pending = record
                .pending
                .iter()
                .map(|id| lookup(*id))
                .collect::<SnapshotResult<Vec<_>>>()?;
            let appointment = resolve_appointment(record.appointment)?;
            proposals.push(Proposal::resume(
                record.id,
                appointment,
                appointments.clone(),
                pending,
            ));
        }

        let mut band = Band::from_parts(
            &self.name,
            &self.style,
            self.min_rehearsals,
            BandParts {
                repertoire: self.repertoire.into_selection(),
                appointments,
                members: roster.into_selection(),
                venues: self.venues.into_selection(),
                ledger: self.ledger.into_selection(),
            },
        )?;
        for proposal in proposals {
            band.track_proposal(proposal);
        }
        Ok(band)
    }
}

#[derive(Default)]
struct MemberRegistry {
    seen: HashSet<MemberId>,
    records: Vec<MemberRecord>,
}

impl MemberRegistry {
    fn insert(&mut self, member: &Member) {
        if self.seen.insert(member.id()) {
            self.records.push(member.to_record());
        }
    }
}
