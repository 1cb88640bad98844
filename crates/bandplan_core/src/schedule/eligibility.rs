//! Attendance rule for substitutes playing a performance.
//!
//! A substitute may take part in a performance only after attending a
//! minimum number of committed rehearsals in the year before it starts.
//! The rule is checked once, when the performance is proposed.

use crate::model::appointment::{
    Appointment, AppointmentKind, AppointmentKindSelector, ParticipantSelector,
};
use crate::model::interval_set::Instant;
use crate::schedule::appointments::Appointments;
use crate::schedule::{ScheduleError, ScheduleResult};
use crate::selection::{shared, Selector};
use chrono::{Months, NaiveDateTime};
use log::info;

const WINDOW_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendancePolicy {
    min_rehearsals: u32,
}

impl AttendancePolicy {
    pub fn new(min_rehearsals: u32) -> Self {
        Self { min_rehearsals }
    }

    pub fn min_rehearsals(&self) -> u32 {
        self.min_rehearsals
    }

    /// Checks every substitute participant of a performance against
    /// `committed`. Rehearsals are not checked.
    ///
    /// # Errors
    /// - `BelowAttendanceThreshold` for the first substitute short of the minimum.
    pub fn check(&self, appointment: &Appointment, committed: &Appointments) -> ScheduleResult<()> {
        if appointment.kind() != AppointmentKind::Performance {
            return Ok(());
        }
        let Some(start) = appointment.period().first() else {
            return Ok(());
        };
        let window = RehearsalWindow::before(start);
        let rehearsals = committed.view(vec![
            shared(AppointmentKindSelector::new(AppointmentKind::Rehearsal)),
            shared(window),
        ]);

        for member in appointment.participants().iter().filter(|m| m.is_substitute()) {
            let attended = rehearsals.filter(ParticipantSelector::new(member)).count();
            if attended < self.min_rehearsals as usize {
                info!(
                    "event=attendance_check module=schedule status=rejected member_id={} attended={} required={}",
                    member.id(),
                    attended,
                    self.min_rehearsals
                );
                return Err(ScheduleError::BelowAttendanceThreshold {
                    member: member.id(),
                    attended,
                    required: self.min_rehearsals,
                });
            }
        }
        Ok(())
    }
}

/// Appointments lying within `[until - 12 months, until)`.
#[derive(Debug, Clone, Copy)]
struct RehearsalWindow {
    from: Instant,
    until: Instant,
}

impl RehearsalWindow {
    fn before(until: Instant) -> Self {
        let from = until
            .checked_sub_months(Months::new(WINDOW_MONTHS))
            .unwrap_or(NaiveDateTime::MIN);
        Self { from, until }
    }
}

impl Selector<Appointment> for RehearsalWindow {
    fn select(&self, item: &Appointment) -> bool {
        let period = item.period();
        period.first().is_some_and(|first| first >= self.from)
            && period.last().is_some_and(|last| last < self.until)
    }
}
