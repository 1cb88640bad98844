//! Profit and loss over stand-alone entries plus committed appointments.

use crate::model::ledger::LedgerEntry;
use crate::schedule::appointments::Appointments;
use crate::selection::{Selection, Selector, SharedSelector};

/// Ledger view bound to a band's canonical appointments.
///
/// Totals add every selected stand-alone entry and the entry of every
/// committed appointment that passes this view's selectors.
#[derive(Clone)]
pub struct ProfitLoss {
    entries: Selection<LedgerEntry>,
    appointments: Appointments,
}

impl ProfitLoss {
    pub fn new(appointments: Appointments) -> Self {
        Self::from_parts(Selection::new(), appointments)
    }

    pub(crate) fn from_parts(entries: Selection<LedgerEntry>, appointments: Appointments) -> Self {
        Self {
            entries,
            appointments,
        }
    }

    /// Derives a view over the same entries, still bound to the same appointments.
    pub fn view(&self, selectors: Vec<SharedSelector<LedgerEntry>>) -> Self {
        Self::from_parts(self.entries.view(selectors), self.appointments.clone())
    }

    pub fn filter<S>(&self, selector: S) -> Self
    where
        S: Selector<LedgerEntry> + 'static,
    {
        Self::from_parts(self.entries.filter(selector), self.appointments.clone())
    }

    /// Books a stand-alone entry.
    pub fn add(&self, entry: LedgerEntry) {
        self.entries.add(entry);
    }

    /// Stand-alone entries of this view.
    pub fn entries(&self) -> &Selection<LedgerEntry> {
        &self.entries
    }

    pub fn revenue(&self) -> f64 {
        self.total(LedgerEntry::revenue)
    }

    pub fn cost(&self) -> f64 {
        self.total(LedgerEntry::cost)
    }

    pub fn profit(&self) -> f64 {
        self.total(LedgerEntry::profit)
    }

    fn total(&self, amount: impl Fn(&LedgerEntry) -> f64) -> f64 {
        let standalone = self.entries.fold(0.0, |sum, entry| sum + amount(entry));
        let mut booked = 0.0;
        self.appointments.for_each(|appointment| {
            let entry = appointment.entry();
            if self.entries.selected(entry) {
                booked += amount(entry);
            }
        });
        standalone + booked
    }
}

#[cfg(test)]
mod tests {
    use super::ProfitLoss;
    use crate::model::appointment::{Appointment, AppointmentKind};
    use crate::model::interval_set::IntervalSet;
    use crate::model::ledger::{EntryPeriodSelector, LedgerEntry};
    use crate::model::venue::Venue;
    use crate::schedule::appointments::Appointments;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(month: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, 10)
            .and_then(|date| date.and_hms_opt(20, 0, 0))
            .expect("valid test date")
    }

    #[test]
    fn totals_include_selected_appointment_entries() {
        let appointments = Appointments::new();
        appointments
            .add(
                Appointment::new(
                    AppointmentKind::Performance,
                    Venue::new("Arena", Vec::new()).expect("valid venue"),
                    at(3),
                    at(3),
                    200.0,
                    900.0,
                    Vec::new(),
                )
                .expect("valid appointment"),
            )
            .expect("no participants");

        let ledger = ProfitLoss::new(appointments);
        ledger.add(LedgerEntry::new(0.0, 120.0, "Strings", at(1)).expect("valid entry"));
        ledger.add(LedgerEntry::new(50.0, 0.0, "Merch", at(6)).expect("valid entry"));

        assert_eq!(ledger.revenue(), 950.0);
        assert_eq!(ledger.cost(), 320.0);
        assert_eq!(ledger.profit(), 630.0);

        let first_quarter =
            ledger.filter(EntryPeriodSelector::new(IntervalSet::closed(at(1), at(3)).expect("valid period")));
        assert_eq!(first_quarter.revenue(), 900.0);
        assert_eq!(first_quarter.cost(), 320.0);
        assert_eq!(first_quarter.profit(), 580.0);
    }
}
