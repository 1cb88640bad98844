//! Canonical appointment collection.
//!
//! # Invariants
//! - `add` refuses appointments with participants.
//! - `remove` notifies every participant of each removed appointment before
//!   it leaves the live sequence.

use crate::model::appointment::Appointment;
use crate::model::notice::Notice;
use crate::schedule::{ScheduleError, ScheduleResult};
use crate::selection::{Cursor, Selection, SelectionResult, Selector, SharedSelector};
use log::info;

/// Selection of appointments with scheduling rules on insert and removal.
///
/// Views share the backing store like any other selection.
#[derive(Clone, Default)]
pub struct Appointments {
    selection: Selection<Appointment>,
}

impl Appointments {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_selection(selection: Selection<Appointment>) -> Self {
        Self { selection }
    }

    pub fn view(&self, selectors: Vec<SharedSelector<Appointment>>) -> Self {
        Self::from_selection(self.selection.view(selectors))
    }

    pub fn filter<S>(&self, selector: S) -> Self
    where
        S: Selector<Appointment> + 'static,
    {
        Self::from_selection(self.selection.filter(selector))
    }

    /// Adds an appointment without participants.
    ///
    /// # Errors
    /// - `ConsensusRequired` when the appointment has participants.
    pub fn add(&self, appointment: Appointment) -> ScheduleResult<()> {
        if !appointment.participants().is_empty() {
            return Err(ScheduleError::ConsensusRequired);
        }
        self.selection.add(appointment);
        Ok(())
    }

    /// Inserts an appointment whose participants all agreed.
    pub(crate) fn commit(&self, appointment: Appointment) {
        info!(
            "event=appointment_commit module=schedule status=ok appointment_id={} participants={}",
            appointment.id(),
            appointment.participants().len()
        );
        self.selection.add(appointment);
    }

    /// Removes every selected appointment, telling its participants first.
    ///
    /// Returns the number of appointments removed.
    ///
    /// # Errors
    /// - `PreconditionViolated` when the collection changes mid-removal.
    pub fn remove(&self) -> SelectionResult<usize> {
        let removed = self.selection.remove_with(|appointment| {
            appointment.notify_participants(&Notice::AppointmentRemoved {
                appointment: appointment.to_string(),
            });
        })?;
        info!(
            "event=appointment_remove module=schedule status=ok removed={}",
            removed
        );
        Ok(removed)
    }

    /// Moves removed appointments selected by this view back to the live sequence.
    pub fn restore(&self) -> SelectionResult<usize> {
        self.selection.restore()
    }

    /// Edits every selected appointment in place; returns how many were visited.
    pub fn update(&self, edit: impl FnMut(&mut Appointment)) -> usize {
        self.selection.for_each_mut(edit)
    }

    /// Edits the first selected appointment in place.
    pub fn update_first<R>(&self, edit: impl FnOnce(&mut Appointment) -> R) -> Option<R> {
        self.selection.update_first(edit)
    }

    /// Sum of revenue minus cost over the selected appointments.
    pub fn profit(&self) -> f64 {
        self.selection
            .fold(0.0, |sum, appointment| sum + appointment.entry().profit())
    }

    pub fn cost(&self) -> f64 {
        self.selection
            .fold(0.0, |sum, appointment| sum + appointment.cost())
    }

    pub fn revenue(&self) -> f64 {
        self.selection
            .fold(0.0, |sum, appointment| sum + appointment.revenue())
    }

    pub fn count(&self) -> usize {
        self.selection.count()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn first(&self) -> Option<Appointment> {
        self.selection.first()
    }

    pub fn as_list(&self) -> Vec<Appointment> {
        self.selection.as_list()
    }

    pub fn selected(&self, appointment: &Appointment) -> bool {
        self.selection.selected(appointment)
    }

    pub fn for_each(&self, visit: impl FnMut(&Appointment)) {
        self.selection.for_each(visit);
    }

    pub fn cursor(&self) -> Cursor<'_, Appointment> {
        self.selection.cursor()
    }

    pub fn render(&self) -> String {
        self.selection.render()
    }

    /// Underlying selection, for snapshotting and shared-store checks.
    pub fn selection(&self) -> &Selection<Appointment> {
        &self.selection
    }
}

impl<'a> IntoIterator for &'a Appointments {
    type Item = Appointment;
    type IntoIter = Cursor<'a, Appointment>;

    fn into_iter(self) -> Self::IntoIter {
        self.selection.cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::Appointments;
    use crate::model::appointment::{Appointment, AppointmentKind, AppointmentKindSelector};
    use crate::model::interval_set::IntervalSet;
    use crate::model::member::Member;
    use crate::model::notice::Notice;
    use crate::model::venue::Venue;
    use crate::schedule::ScheduleError;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 9, day)
            .and_then(|date| date.and_hms_opt(19, 0, 0))
            .expect("valid test date")
    }

    fn appointment(
        kind: AppointmentKind,
        cost: f64,
        revenue: f64,
        participants: Vec<Member>,
    ) -> Appointment {
        Appointment::new(
            kind,
            Venue::new("Hall", Vec::new()).expect("valid venue"),
            at(1),
            at(2),
            cost,
            revenue,
            participants,
        )
        .expect("valid appointment")
    }

    #[test]
    fn add_refuses_appointments_with_participants() {
        let appointments = Appointments::new();
        let anna = Member::new("Anna", "", "Drums", IntervalSet::universal(), false)
            .expect("valid member");

        let err = appointments
            .add(appointment(AppointmentKind::Rehearsal, 0.0, 0.0, vec![anna]))
            .unwrap_err();
        assert_eq!(err, ScheduleError::ConsensusRequired);
        assert!(appointments.is_empty());

        appointments
            .add(appointment(AppointmentKind::Rehearsal, 0.0, 0.0, Vec::new()))
            .expect("no participants");
        assert_eq!(appointments.count(), 1);
    }

    #[test]
    fn remove_notifies_participants_before_removal() {
        let appointments = Appointments::new();
        let anna = Member::new("Anna", "", "Drums", IntervalSet::universal(), false)
            .expect("valid member");
        appointments.commit(appointment(
            AppointmentKind::Performance,
            0.0,
            0.0,
            vec![anna.clone()],
        ));

        assert_eq!(appointments.remove(), Ok(1));
        assert!(appointments.is_empty());
        assert!(matches!(
            anna.messages().as_slice(),
            [Notice::AppointmentRemoved { .. }]
        ));
        assert_eq!(appointments.restore(), Ok(1));
    }

    #[test]
    fn aggregates_follow_the_view() {
        let appointments = Appointments::new();
        appointments.commit(appointment(AppointmentKind::Rehearsal, 30.0, 0.0, Vec::new()));
        appointments.commit(appointment(AppointmentKind::Performance, 100.0, 450.0, Vec::new()));

        assert_eq!(appointments.cost(), 130.0);
        assert_eq!(appointments.profit(), 320.0);

        let performances =
            appointments.filter(AppointmentKindSelector::new(AppointmentKind::Performance));
        assert_eq!(performances.profit(), 350.0);
        assert_eq!(performances.revenue(), 450.0);
    }

    #[test]
    fn update_edits_stored_appointments_through_a_view() {
        let appointments = Appointments::new();
        appointments.commit(appointment(AppointmentKind::Rehearsal, 30.0, 0.0, Vec::new()));

        let edited = appointments.update(|appointment| {
            appointment.set_cost(45.0).expect("valid cost");
        });
        assert_eq!(edited, 1);
        assert_eq!(appointments.cost(), 45.0);
        assert_eq!(appointments.update_first(Appointment::undo), Some(true));
        assert_eq!(appointments.cost(), 30.0);
    }
}
