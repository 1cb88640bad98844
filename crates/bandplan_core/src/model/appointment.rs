//! Rehearsals and performances with their money, participants and undo history.
//!
//! # Responsibility
//! - Own venue, period and ledger entry of one appointment.
//! - Record a snapshot before every mutation so `undo` can step back.
//! - Tell every participant about each change, revert and removal.
//!
//! # Invariants
//! - `participants` holds no member twice and never changes after creation.
//! - The ledger entry is labelled with the kind and dated at the period end.
//! - A failed setter leaves fields and history untouched.
//!
//! # See also
//! - `schedule::appointments` for the canonical collection and removal notices.

use crate::model::interval_set::{Instant, IntervalSet};
use crate::model::ledger::LedgerEntry;
use crate::model::member::{Member, MemberId};
use crate::model::notice::{ChangedField, Notice};
use crate::model::validation::ValidationError;
use crate::model::venue::Venue;
use crate::selection::Selector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const SUMMARY_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    Rehearsal,
    Performance,
}

impl AppointmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rehearsal => "Rehearsal",
            Self::Performance => "Performance",
        }
    }
}

impl Display for AppointmentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable fields captured by one undo step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentFields {
    pub venue: Venue,
    pub period: IntervalSet,
    pub entry: LedgerEntry,
}

#[derive(Debug, Clone)]
pub struct Appointment {
    id: Uuid,
    kind: AppointmentKind,
    fields: AppointmentFields,
    participants: Vec<Member>,
    history: Vec<AppointmentFields>,
}

/// Serializable form of an appointment; participants are stored by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: Uuid,
    pub kind: AppointmentKind,
    pub fields: AppointmentFields,
    pub participants: Vec<MemberId>,
    #[serde(default)]
    pub history: Vec<AppointmentFields>,
}

impl Appointment {
    /// Creates an appointment over `[start, end]` with an empty undo history.
    ///
    /// # Errors
    /// - `DescendingInstants` when `end` is before `start`.
    /// - `InvalidAmount` when `cost` or `revenue` is negative or not finite.
    /// - `DuplicateParticipant` when a member is listed twice.
    pub fn new(
        kind: AppointmentKind,
        venue: Venue,
        start: Instant,
        end: Instant,
        cost: f64,
        revenue: f64,
        participants: Vec<Member>,
    ) -> Result<Self, ValidationError> {
        let period = IntervalSet::closed(start, end)?;
        let entry = LedgerEntry::new(revenue, cost, kind.as_str(), end)?;
        ensure_distinct(participants.iter().map(Member::id))?;
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            fields: AppointmentFields {
                venue,
                period,
                entry,
            },
            participants,
            history: Vec::new(),
        })
    }

    /// Rebuilds an appointment from its record.
    ///
    /// `participants` are the member handles resolved from
    /// `record.participants`, in the same order.
    ///
    /// # Errors
    /// - `DuplicateParticipant` when a member is listed twice.
    /// - `MissingPeriodBounds` when a stored period is not a closed interval set.
    pub fn from_record(
        record: AppointmentRecord,
        participants: Vec<Member>,
    ) -> Result<Self, ValidationError> {
        ensure_distinct(participants.iter().map(Member::id))?;
        ensure_bounded(&record.fields.period)?;
        for fields in &record.history {
            ensure_bounded(&fields.period)?;
        }
        Ok(Self {
            id: record.id,
            kind: record.kind,
            fields: record.fields,
            participants,
            history: record.history,
        })
    }

    pub fn to_record(&self) -> AppointmentRecord {
        AppointmentRecord {
            id: self.id,
            kind: self.kind,
            fields: self.fields.clone(),
            participants: self.participants.iter().map(Member::id).collect(),
            history: self.history.clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> AppointmentKind {
        self.kind
    }

    pub fn venue(&self) -> &Venue {
        &self.fields.venue
    }

    pub fn period(&self) -> &IntervalSet {
        &self.fields.period
    }

    pub fn entry(&self) -> &LedgerEntry {
        &self.fields.entry
    }

    pub fn cost(&self) -> f64 {
        self.fields.entry.cost()
    }

    pub fn revenue(&self) -> f64 {
        self.fields.entry.revenue()
    }

    pub fn participants(&self) -> &[Member] {
        &self.participants
    }

    pub fn has_participant(&self, member: &Member) -> bool {
        self.participants.contains(member)
    }

    /// Number of steps `undo` can still take.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn set_venue(&mut self, venue: Venue) {
        let previous = self.begin_update();
        let from = self.fields.venue.to_string();
        self.fields.venue = venue;
        let to = self.fields.venue.to_string();
        self.announce_change(previous, ChangedField::Venue, from, to);
    }

    /// Moves the appointment to `[start, end]` and rebooks its ledger entry at `end`.
    ///
    /// # Errors
    /// - `DescendingInstants` when `end` is before `start`.
    pub fn set_period(&mut self, start: Instant, end: Instant) -> Result<(), ValidationError> {
        let period = IntervalSet::closed(start, end)?;
        let previous = self.begin_update();
        let from = self.fields.period.render(SUMMARY_FORMAT);
        self.fields.entry = self.fields.entry.with_date(end);
        self.fields.period = period;
        let to = self.fields.period.render(SUMMARY_FORMAT);
        self.announce_change(previous, ChangedField::Period, from, to);
        Ok(())
    }

    /// # Errors
    /// - `InvalidAmount` when `cost` is negative or not finite.
    pub fn set_cost(&mut self, cost: f64) -> Result<(), ValidationError> {
        let entry = self.fields.entry.with_cost(cost)?;
        let previous = self.begin_update();
        let from = format!("{:.2}", self.cost());
        self.fields.entry = entry;
        let to = format!("{:.2}", self.cost());
        self.announce_change(previous, ChangedField::Cost, from, to);
        Ok(())
    }

    /// # Errors
    /// - `InvalidAmount` when `revenue` is negative or not finite.
    pub fn set_revenue(&mut self, revenue: f64) -> Result<(), ValidationError> {
        let entry = self.fields.entry.with_revenue(revenue)?;
        let previous = self.begin_update();
        let from = format!("{:.2}", self.revenue());
        self.fields.entry = entry;
        let to = format!("{:.2}", self.revenue());
        self.announce_change(previous, ChangedField::Revenue, from, to);
        Ok(())
    }

    /// Restores the fields saved before the latest mutation.
    ///
    /// Returns `false` and sends nothing when there is no history left.
    pub fn undo(&mut self) -> bool {
        let Some(fields) = self.history.pop() else {
            return false;
        };
        let notice = Notice::AppointmentReverted {
            appointment: self.to_string(),
        };
        self.fields = fields;
        self.notify_participants(&notice);
        true
    }

    /// `summary, cost: x, revenue: y`.
    pub fn detail(&self) -> String {
        format!(
            "{}, cost: {:.2}, revenue: {:.2}",
            self,
            self.cost(),
            self.revenue()
        )
    }

    pub(crate) fn notify_participants(&self, notice: &Notice) {
        for member in &self.participants {
            member.notify(notice.clone());
        }
    }

    /// Pushes the current fields onto the history and returns the summary
    /// as it read before the change.
    fn begin_update(&mut self) -> String {
        let summary = self.to_string();
        self.history.push(self.fields.clone());
        summary
    }

    fn announce_change(&self, appointment: String, field: ChangedField, from: String, to: String) {
        self.notify_participants(&Notice::AppointmentChanged {
            appointment,
            field,
            from,
            to,
        });
    }
}

impl Display for Appointment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} {}",
            self.kind,
            self.fields.venue,
            self.fields.period.render(SUMMARY_FORMAT)
        )
    }
}

fn ensure_distinct(ids: impl Iterator<Item = MemberId>) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateParticipant(id));
        }
    }
    Ok(())
}

fn ensure_bounded(period: &IntervalSet) -> Result<(), ValidationError> {
    if period.is_universal() || period.is_unbounded() {
        return Err(ValidationError::MissingPeriodBounds);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct AppointmentKindSelector {
    kind: AppointmentKind,
}

impl AppointmentKindSelector {
    pub fn new(kind: AppointmentKind) -> Self {
        Self { kind }
    }
}

impl Selector<Appointment> for AppointmentKindSelector {
    fn select(&self, item: &Appointment) -> bool {
        item.kind == self.kind
    }
}

/// Matches appointments a given member takes part in.
#[derive(Debug, Clone, Copy)]
pub struct ParticipantSelector {
    member: MemberId,
}

impl ParticipantSelector {
    pub fn new(member: &Member) -> Self {
        Self {
            member: member.id(),
        }
    }
}

impl Selector<Appointment> for ParticipantSelector {
    fn select(&self, item: &Appointment) -> bool {
        item.participants.iter().any(|member| member.id() == self.member)
    }
}

/// Matches appointments whose period lies inside `within`.
#[derive(Debug, Clone)]
pub struct AppointmentPeriodSelector {
    within: IntervalSet,
}

impl AppointmentPeriodSelector {
    pub fn new(within: IntervalSet) -> Self {
        Self { within }
    }
}

impl Selector<Appointment> for AppointmentPeriodSelector {
    fn select(&self, item: &Appointment) -> bool {
        self.within.contains(&item.fields.period)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Appointment, AppointmentKind, AppointmentKindSelector, AppointmentPeriodSelector,
        ParticipantSelector,
    };
    use crate::model::interval_set::IntervalSet;
    use crate::model::member::Member;
    use crate::model::notice::{ChangedField, Notice};
    use crate::model::validation::ValidationError;
    use crate::model::venue::Venue;
    use crate::selection::Selector;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 5, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .expect("valid test date")
    }

    fn venue(name: &str) -> Venue {
        Venue::new(name, Vec::new()).expect("valid venue")
    }

    fn member(name: &str) -> Member {
        Member::new(name, "", "Guitar", IntervalSet::universal(), false).expect("valid member")
    }

    fn rehearsal(participants: Vec<Member>) -> Appointment {
        Appointment::new(
            AppointmentKind::Rehearsal,
            venue("Basement"),
            at(3, 18),
            at(3, 21),
            40.0,
            0.0,
            participants,
        )
        .expect("valid appointment")
    }

    #[test]
    fn new_labels_entry_with_kind_and_period_end() {
        let appointment = rehearsal(Vec::new());
        assert_eq!(appointment.entry().label(), "Rehearsal");
        assert_eq!(appointment.entry().date(), at(3, 21));
        assert_eq!(
            appointment.to_string(),
            "Rehearsal: Basement [03.05.2021 18:00 - 03.05.2021 21:00]"
        );
    }

    #[test]
    fn new_rejects_duplicates_and_reversed_periods() {
        let anna = member("Anna");
        let err = Appointment::new(
            AppointmentKind::Rehearsal,
            venue("Basement"),
            at(3, 18),
            at(3, 21),
            0.0,
            0.0,
            vec![anna.clone(), anna.clone()],
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateParticipant(anna.id()));

        assert!(Appointment::new(
            AppointmentKind::Performance,
            venue("Arena"),
            at(3, 21),
            at(3, 18),
            0.0,
            0.0,
            Vec::new(),
        )
        .is_err());
    }

    #[test]
    fn setters_notify_participants_with_old_and_new_value() {
        let anna = member("Anna");
        let mut appointment = rehearsal(vec![anna.clone()]);

        appointment.set_cost(55.5).expect("valid cost");
        appointment.set_venue(venue("Garage"));

        let messages = anna.take_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0],
            Notice::AppointmentChanged {
                appointment: "Rehearsal: Basement [03.05.2021 18:00 - 03.05.2021 21:00]"
                    .to_string(),
                field: ChangedField::Cost,
                from: "40.00".to_string(),
                to: "55.50".to_string(),
            }
        );
        assert!(messages[1].to_string().contains("Basement -> Garage"));
        assert_eq!(appointment.history_len(), 2);
    }

    #[test]
    fn invalid_amount_leaves_history_untouched() {
        let anna = member("Anna");
        let mut appointment = rehearsal(vec![anna.clone()]);

        assert!(appointment.set_revenue(f64::INFINITY).is_err());
        assert_eq!(appointment.history_len(), 0);
        assert_eq!(anna.message_count(), 0);
    }

    #[test]
    fn set_period_rebooks_entry_and_undo_restores_it() {
        let mut appointment = rehearsal(Vec::new());
        appointment.set_period(at(10, 18), at(10, 22)).expect("valid period");
        assert_eq!(appointment.entry().date(), at(10, 22));

        assert!(appointment.undo());
        assert_eq!(appointment.entry().date(), at(3, 21));
        assert_eq!(appointment.period().first(), Some(at(3, 18)));
        assert!(!appointment.undo());
    }

    #[test]
    fn selectors_match_kind_participant_and_period() {
        let anna = member("Anna");
        let appointment = rehearsal(vec![anna.clone()]);
        let may = IntervalSet::closed(at(1, 0), at(31, 0)).expect("valid period");

        assert!(AppointmentKindSelector::new(AppointmentKind::Rehearsal).select(&appointment));
        assert!(!AppointmentKindSelector::new(AppointmentKind::Performance).select(&appointment));
        assert!(ParticipantSelector::new(&anna).select(&appointment));
        assert!(!ParticipantSelector::new(&member("Anna")).select(&appointment));
        assert!(AppointmentPeriodSelector::new(may).select(&appointment));
    }

    #[test]
    fn record_round_trip_keeps_id_and_history() {
        let anna = member("Anna");
        let mut appointment = rehearsal(vec![anna.clone()]);
        appointment.set_cost(10.0).expect("valid cost");

        let record = appointment.to_record();
        assert_eq!(record.participants, vec![anna.id()]);
        let restored =
            Appointment::from_record(record.clone(), vec![anna.clone()]).expect("valid record");
        assert_eq!(restored.id(), appointment.id());
        assert_eq!(restored.history_len(), 1);
        assert!(restored.has_participant(&anna));

        let duplicated = Appointment::from_record(record, vec![anna.clone(), anna.clone()]);
        assert!(duplicated.is_err());
    }
}
