//! Band members as shared handles.
//!
//! # Responsibility
//! - Hold personal data and the substitute flag.
//! - Receive notices into a FIFO mailbox.
//! - Keep the queue of proposals waiting for this member's vote.
//!
//! # Invariants
//! - `id` is stable for the member's lifetime and across snapshots.
//! - Clones share one identity; equality compares ids only.
//! - The proposal inbox holds weak links, so a dropped proposal disappears
//!   from every inbox on the next read.

use crate::model::interval_set::{Instant, IntervalSet};
use crate::model::notice::Notice;
use crate::model::validation::{require_text, ValidationError};
use crate::schedule::proposal::{Proposal, WeakProposal};
use crate::selection::{Selection, Selector};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use uuid::Uuid;

pub type MemberId = Uuid;

/// Shared handle to one band member.
#[derive(Clone)]
pub struct Member {
    inner: Rc<MemberInner>,
}

struct MemberInner {
    id: MemberId,
    name: String,
    phone: String,
    instrument: String,
    availability: IntervalSet,
    substitute: Cell<bool>,
    mailbox: RefCell<VecDeque<Notice>>,
    proposals: RefCell<Vec<WeakProposal>>,
}

/// Serializable form of a member, without the proposal inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: MemberId,
    pub name: String,
    pub phone: String,
    pub instrument: String,
    pub availability: IntervalSet,
    pub substitute: bool,
    #[serde(default)]
    pub mailbox: Vec<Notice>,
}

impl Member {
    /// Creates a member with a fresh id, an empty mailbox and no proposals.
    ///
    /// # Errors
    /// - `EmptyField` when `name` or `instrument` is blank.
    pub fn new(
        name: &str,
        phone: &str,
        instrument: &str,
        availability: IntervalSet,
        substitute: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self::from_parts(
            Uuid::new_v4(),
            require_text("member name", name)?,
            phone.trim().to_string(),
            require_text("instrument", instrument)?,
            availability,
            substitute,
            VecDeque::new(),
        ))
    }

    /// Rebuilds a member from its record, keeping the stored id and mailbox.
    ///
    /// # Errors
    /// - `EmptyField` when the stored name or instrument is blank.
    pub fn from_record(record: MemberRecord) -> Result<Self, ValidationError> {
        Ok(Self::from_parts(
            record.id,
            require_text("member name", &record.name)?,
            record.phone,
            require_text("instrument", &record.instrument)?,
            record.availability,
            record.substitute,
            record.mailbox.into(),
        ))
    }

    fn from_parts(
        id: MemberId,
        name: String,
        phone: String,
        instrument: String,
        availability: IntervalSet,
        substitute: bool,
        mailbox: VecDeque<Notice>,
    ) -> Self {
        Self {
            inner: Rc::new(MemberInner {
                id,
                name,
                phone,
                instrument,
                availability,
                substitute: Cell::new(substitute),
                mailbox: RefCell::new(mailbox),
                proposals: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn to_record(&self) -> MemberRecord {
        MemberRecord {
            id: self.inner.id,
            name: self.inner.name.clone(),
            phone: self.inner.phone.clone(),
            instrument: self.inner.instrument.clone(),
            availability: self.inner.availability.clone(),
            substitute: self.inner.substitute.get(),
            mailbox: self.messages(),
        }
    }

    pub fn id(&self) -> MemberId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn phone(&self) -> &str {
        &self.inner.phone
    }

    pub fn instrument(&self) -> &str {
        &self.inner.instrument
    }

    pub fn availability(&self) -> &IntervalSet {
        &self.inner.availability
    }

    pub fn is_substitute(&self) -> bool {
        self.inner.substitute.get()
    }

    pub fn set_substitute(&self, substitute: bool) {
        self.inner.substitute.set(substitute);
    }

    /// Appends `notice` to the mailbox.
    pub fn notify(&self, notice: Notice) {
        self.inner.mailbox.borrow_mut().push_back(notice);
    }

    /// Mailbox contents, oldest first.
    pub fn messages(&self) -> Vec<Notice> {
        self.inner.mailbox.borrow().iter().cloned().collect()
    }

    pub fn message_count(&self) -> usize {
        self.inner.mailbox.borrow().len()
    }

    /// Empties the mailbox and returns what it held, oldest first.
    pub fn take_messages(&self) -> Vec<Notice> {
        self.inner.mailbox.borrow_mut().drain(..).collect()
    }

    /// Proposals still waiting for this member, oldest first.
    pub fn pending_proposals(&self) -> Vec<Proposal> {
        let mut proposals = self.inner.proposals.borrow_mut();
        proposals.retain(|link| link.strong_count() > 0);
        proposals.iter().filter_map(Proposal::upgrade).collect()
    }

    pub(crate) fn deliver_proposal(&self, proposal: &Proposal) {
        self.inner.proposals.borrow_mut().push(proposal.downgrade());
    }

    /// Drops `proposal` from the inbox; no-op when it was never delivered.
    pub(crate) fn revoke_proposal(&self, proposal: &Proposal) {
        self.inner
            .proposals
            .borrow_mut()
            .retain(|link| link.strong_count() > 0 && !proposal.is_link(link));
    }

    /// `name (instrument) availability`, phone and substitute marker on a second line.
    pub fn detail(&self) -> String {
        format!(
            "{} ({}) {}\nphone: {}{}",
            self.inner.name,
            self.inner.instrument,
            self.inner.availability,
            self.inner.phone,
            if self.is_substitute() { ", substitute" } else { "" }
        )
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Member {}

impl Hash for Member {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl Debug for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("instrument", &self.inner.instrument)
            .field("substitute", &self.inner.substitute.get())
            .finish()
    }
}

impl Display for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner.name)
    }
}

/// Matches substitutes (`true`) or regular members (`false`).
#[derive(Debug, Clone, Copy)]
pub struct SubstituteSelector {
    substitute: bool,
}

impl SubstituteSelector {
    pub fn new(substitute: bool) -> Self {
        Self { substitute }
    }
}

impl Selector<Member> for SubstituteSelector {
    fn select(&self, item: &Member) -> bool {
        item.is_substitute() == self.substitute
    }
}

/// Matches members available at an instant.
#[derive(Debug, Clone, Copy)]
pub struct MemberAvailabilitySelector {
    at: Instant,
}

impl MemberAvailabilitySelector {
    pub fn new(at: Instant) -> Self {
        Self { at }
    }
}

impl Selector<Member> for MemberAvailabilitySelector {
    fn select(&self, item: &Member) -> bool {
        item.availability().point_in(self.at)
    }
}

#[derive(Debug, Clone)]
pub struct InstrumentSelector {
    instrument: String,
}

impl InstrumentSelector {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
        }
    }
}

impl Selector<Member> for InstrumentSelector {
    fn select(&self, item: &Member) -> bool {
        item.instrument().eq_ignore_ascii_case(&self.instrument)
    }
}

/// Matches members whose name equals any of `names`, ignoring case.
#[derive(Debug, Clone)]
pub struct MemberNameSelector {
    names: Vec<String>,
}

impl MemberNameSelector {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl Selector<Member> for MemberNameSelector {
    fn select(&self, item: &Member) -> bool {
        self.names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(item.name()))
    }
}

pub type Members = Selection<Member>;
