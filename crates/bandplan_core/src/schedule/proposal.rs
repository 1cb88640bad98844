//! Pending appointments waiting for every participant's consent.
//!
//! # Responsibility
//! - Track which participants still have to accept.
//! - Commit the appointment into its target collection on the last accept.
//! - Retract the proposal for everyone on the first decline.
//!
//! # Invariants
//! - State moves `Proposed -> Accepted | Retracted` once; both are terminal.
//! - `pending` is a subset of the appointment's participants.
//! - A member's inbox holds the proposal exactly while the member is pending.

use crate::model::appointment::Appointment;
use crate::model::member::Member;
use crate::model::notice::Notice;
use crate::schedule::appointments::Appointments;
use crate::schedule::{ScheduleError, ScheduleResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt::{Debug, Display, Formatter};
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Non-owning link stored in member inboxes.
pub(crate) type WeakProposal = Weak<RefCell<ProposalInner>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    Proposed,
    Accepted,
    Retracted,
}

pub(crate) struct ProposalInner {
    id: Uuid,
    appointment: Appointment,
    target: Appointments,
    pending: Vec<Member>,
    state: ProposalState,
}

/// Shared handle to one proposal; clones refer to the same proposal.
#[derive(Clone)]
pub struct Proposal {
    inner: Rc<RefCell<ProposalInner>>,
}

impl Proposal {
    /// Creates a proposal pending on every participant and delivers it to
    /// each participant's inbox.
    pub(crate) fn open(appointment: Appointment, target: Appointments) -> Self {
        let pending = appointment.participants().to_vec();
        Self::resume(Uuid::new_v4(), appointment, target, pending)
    }

    /// Rebuilds an open proposal and delivers it to the `pending` members only.
    pub(crate) fn resume(
        id: Uuid,
        appointment: Appointment,
        target: Appointments,
        pending: Vec<Member>,
    ) -> Self {
        let proposal = Self {
            inner: Rc::new(RefCell::new(ProposalInner {
                id,
                appointment,
                target,
                pending,
                state: ProposalState::Proposed,
            })),
        };
        for member in proposal.pending() {
            member.deliver_proposal(&proposal);
        }
        proposal
    }

    pub fn id(&self) -> Uuid {
        self.inner.borrow().id
    }

    pub fn state(&self) -> ProposalState {
        self.inner.borrow().state
    }

    pub fn is_open(&self) -> bool {
        self.state() == ProposalState::Proposed
    }

    /// Copy of the proposed appointment.
    pub fn appointment(&self) -> Appointment {
        self.inner.borrow().appointment.clone()
    }

    /// Participants who have not accepted yet.
    pub fn pending(&self) -> Vec<Member> {
        self.inner.borrow().pending.clone()
    }

    /// Records `member`'s consent.
    ///
    /// When nobody is pending afterwards, the appointment is committed to the
    /// target collection and the proposal leaves every inbox.
    ///
    /// # Errors
    /// - `ProposalAlreadyResolved` when the proposal is accepted or retracted.
    pub fn accept(&self, member: &Member) -> ScheduleResult<ProposalState> {
        let committed = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != ProposalState::Proposed {
                return Err(ScheduleError::ProposalAlreadyResolved);
            }
            inner.pending.retain(|pending| pending != member);
            if inner.pending.is_empty() {
                inner.state = ProposalState::Accepted;
                Some((inner.appointment.clone(), inner.target.clone()))
            } else {
                None
            }
        };
        member.revoke_proposal(self);

        if let Some((appointment, target)) = committed {
            for participant in appointment.participants() {
                participant.revoke_proposal(self);
            }
            info!(
                "event=proposal_accept module=schedule status=ok proposal_id={}",
                self.id()
            );
            target.commit(appointment);
        }
        Ok(self.state())
    }

    /// Rejects the proposal on behalf of `member`.
    ///
    /// Only original participants can decline; for anybody else this is a
    /// no-op returning the unchanged state. A decline removes the proposal
    /// from every participant's inbox and sends `reason` to all the others.
    ///
    /// # Errors
    /// - `ProposalAlreadyResolved` when the proposal is accepted or retracted.
    pub fn decline(&self, member: &Member, reason: &str) -> ScheduleResult<ProposalState> {
        let (participants, summary) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != ProposalState::Proposed {
                return Err(ScheduleError::ProposalAlreadyResolved);
            }
            if !inner.appointment.has_participant(member) {
                return Ok(inner.state);
            }
            inner.state = ProposalState::Retracted;
            inner.pending.clear();
            (
                inner.appointment.participants().to_vec(),
                inner.appointment.to_string(),
            )
        };

        for participant in &participants {
            participant.revoke_proposal(self);
            if participant != member {
                participant.notify(Notice::ProposalDeclined {
                    declined_by: member.name().to_string(),
                    reason: reason.to_string(),
                    appointment: summary.clone(),
                });
            }
        }
        info!(
            "event=proposal_decline module=schedule status=ok proposal_id={} notified={}",
            self.id(),
            participants.len().saturating_sub(1)
        );
        Ok(ProposalState::Retracted)
    }

    /// `appointment detail, pending: [a, b]`.
    pub fn detail(&self) -> String {
        let inner = self.inner.borrow();
        let pending = inner
            .pending
            .iter()
            .map(Member::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}, pending: [{}]", inner.appointment.detail(), pending)
    }

    pub(crate) fn downgrade(&self) -> WeakProposal {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(link: &WeakProposal) -> Option<Self> {
        link.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn is_link(&self, link: &WeakProposal) -> bool {
        std::ptr::eq(link.as_ptr(), Rc::as_ptr(&self.inner))
    }
}

impl PartialEq for Proposal {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Proposal {}

impl Debug for Proposal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Proposal")
            .field("id", &inner.id)
            .field("appointment", &inner.appointment.id())
            .field("pending", &inner.pending.len())
            .field("state", &inner.state)
            .finish()
    }
}

impl Display for Proposal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner.borrow().appointment)
    }
}

#[cfg(test)]
mod tests {
    use super::{Proposal, ProposalState};
    use crate::model::appointment::{Appointment, AppointmentKind};
    use crate::model::interval_set::IntervalSet;
    use crate::model::member::Member;
    use crate::model::notice::Notice;
    use crate::model::venue::Venue;
    use crate::schedule::appointments::Appointments;
    use crate::schedule::ScheduleError;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 4, 14)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .expect("valid test date")
    }

    fn member(name: &str) -> Member {
        Member::new(name, "", "Guitar", IntervalSet::universal(), false).expect("valid member")
    }

    fn open(participants: &[Member], target: &Appointments) -> Proposal {
        let appointment = Appointment::new(
            AppointmentKind::Rehearsal,
            Venue::new("Basement", Vec::new()).expect("valid venue"),
            at(18),
            at(21),
            0.0,
            0.0,
            participants.to_vec(),
        )
        .expect("valid appointment");
        Proposal::open(appointment, target.clone())
    }

    #[test]
    fn open_delivers_to_every_participant() {
        let (anna, ben) = (member("Anna"), member("Ben"));
        let proposal = open(&[anna.clone(), ben.clone()], &Appointments::new());

        assert_eq!(anna.pending_proposals(), vec![proposal.clone()]);
        assert_eq!(ben.pending_proposals(), vec![proposal]);
    }

    #[test]
    fn commits_only_after_the_last_accept() {
        let target = Appointments::new();
        let (anna, ben) = (member("Anna"), member("Ben"));
        let proposal = open(&[anna.clone(), ben.clone()], &target);

        assert_eq!(proposal.accept(&anna), Ok(ProposalState::Proposed));
        assert!(anna.pending_proposals().is_empty());
        assert_eq!(ben.pending_proposals().len(), 1);
        assert!(target.is_empty());

        assert_eq!(proposal.accept(&ben), Ok(ProposalState::Accepted));
        assert_eq!(target.count(), 1);
        assert!(ben.pending_proposals().is_empty());
        assert_eq!(
            proposal.accept(&ben),
            Err(ScheduleError::ProposalAlreadyResolved)
        );
    }

    #[test]
    fn decline_retracts_for_everyone_and_notifies_the_others() {
        let target = Appointments::new();
        let (anna, ben, carla) = (member("Anna"), member("Ben"), member("Carla"));
        let proposal = open(&[anna.clone(), ben.clone(), carla.clone()], &target);
        proposal.accept(&anna).expect("open proposal");

        assert_eq!(
            proposal.decline(&ben, "on holiday"),
            Ok(ProposalState::Retracted)
        );
        assert!(target.is_empty());
        for participant in [&anna, &ben, &carla] {
            assert!(participant.pending_proposals().is_empty());
        }
        assert_eq!(ben.message_count(), 0);
        assert!(matches!(
            carla.messages().as_slice(),
            [Notice::ProposalDeclined { declined_by, reason, .. }]
                if declined_by == "Ben" && reason == "on holiday"
        ));
        assert_eq!(anna.message_count(), 1);
        assert_eq!(
            proposal.decline(&anna, "too late"),
            Err(ScheduleError::ProposalAlreadyResolved)
        );
    }

    #[test]
    fn decline_by_outsider_changes_nothing() {
        let anna = member("Anna");
        let proposal = open(&[anna.clone()], &Appointments::new());

        assert_eq!(
            proposal.decline(&member("Mallory"), "no"),
            Ok(ProposalState::Proposed)
        );
        assert_eq!(anna.pending_proposals().len(), 1);
        assert_eq!(anna.message_count(), 0);
    }

    #[test]
    fn dropped_proposal_disappears_from_inbox() {
        let anna = member("Anna");
        drop(open(&[anna.clone()], &Appointments::new()));
        assert!(anna.pending_proposals().is_empty());
    }
}
