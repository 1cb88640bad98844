use bandplan_core::{
    Appointment, AppointmentKind, ChangedField, IntervalSet, Member, Notice, ValidationError, Venue,
};
use chrono::{NaiveDate, NaiveDateTime};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 8, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn gig(participants: Vec<Member>) -> Appointment {
    Appointment::new(
        AppointmentKind::Performance,
        Venue::new("Stadtsaal", Vec::new()).unwrap(),
        at(20, 20),
        at(20, 23),
        300.0,
        1200.0,
        participants,
    )
    .unwrap()
}

#[test]
fn undo_walks_back_one_mutation_at_a_time() {
    let anna = Member::new("Anna", "", "Vocals", IntervalSet::universal(), false).unwrap();
    let mut appointment = gig(vec![anna.clone()]);

    appointment.set_revenue(1500.0).unwrap();
    appointment.set_venue(Venue::new("Arena", Vec::new()).unwrap());
    appointment.set_period(at(21, 20), at(21, 23)).unwrap();
    assert_eq!(appointment.history_len(), 3);

    assert!(appointment.undo());
    assert_eq!(appointment.period().first(), Some(at(20, 20)));
    assert_eq!(appointment.venue().name(), "Arena");

    assert!(appointment.undo());
    assert_eq!(appointment.venue().name(), "Stadtsaal");
    assert_eq!(appointment.revenue(), 1500.0);

    assert!(appointment.undo());
    assert_eq!(appointment.revenue(), 1200.0);
    assert!(!appointment.undo());

    let messages = anna.take_messages();
    assert_eq!(messages.len(), 6);
    assert!(matches!(
        &messages[0],
        Notice::AppointmentChanged { field: ChangedField::Revenue, from, to, .. }
            if from == "1200.00" && to == "1500.00"
    ));
    assert!(matches!(&messages[3], Notice::AppointmentReverted { .. }));
}

#[test]
fn undo_on_fresh_appointment_sends_nothing() {
    let anna = Member::new("Anna", "", "Vocals", IntervalSet::universal(), false).unwrap();
    let mut appointment = gig(vec![anna.clone()]);
    assert!(!appointment.undo());
    assert_eq!(anna.message_count(), 0);
}

#[test]
fn rejected_setters_do_not_grow_history() {
    let mut appointment = gig(Vec::new());
    assert!(matches!(
        appointment.set_cost(-1.0),
        Err(ValidationError::InvalidAmount { field: "cost", .. })
    ));
    assert!(appointment.set_period(at(22, 0), at(21, 0)).is_err());
    assert_eq!(appointment.history_len(), 0);
    assert_eq!(
        appointment.detail(),
        "Performance: Stadtsaal [20.08.2024 20:00 - 20.08.2024 23:00], cost: 300.00, revenue: 1200.00"
    );
}
