use bandplan_core::{Instant, IntervalSet, ValidationError};
use chrono::NaiveDate;

fn day(year: i32, month: u32, day: u32) -> Instant {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn closed_interval_contains_nested_interval() {
    let january = IntervalSet::closed(day(2020, 1, 1), day(2020, 1, 31)).unwrap();
    let middle = IntervalSet::closed(day(2020, 1, 10), day(2020, 1, 20)).unwrap();
    assert!(january.contains(&middle));
    assert!(!middle.contains(&january));
}

#[test]
fn adjacent_intervals_do_not_merge() {
    let halves = IntervalSet::new(vec![
        day(2020, 1, 1),
        day(2020, 1, 15),
        day(2020, 1, 16),
        day(2020, 1, 31),
    ])
    .unwrap();
    let straddling = IntervalSet::closed(day(2020, 1, 10), day(2020, 1, 20)).unwrap();
    assert!(!halves.contains(&straddling));
}

#[test]
fn unbounded_tail_covers_every_later_instant() {
    let from_june = IntervalSet::starting_at(day(2020, 6, 1));
    assert!(from_june.point_in(day(2020, 12, 31)));
    assert!(from_june.point_in(day(2021, 1, 1)));
    assert!(!from_june.point_in(day(2020, 5, 1)));
}

#[test]
fn universal_set_contains_everything_but_is_contained_by_nothing_else() {
    let universal = IntervalSet::universal();
    let year = IntervalSet::closed(day(2020, 1, 1), day(2020, 12, 31)).unwrap();
    assert!(universal.contains(&year));
    assert!(universal.point_in(day(1900, 1, 1)));
    assert!(!year.contains(&universal));
}

#[test]
fn json_round_trip_validates_order() {
    let set = IntervalSet::closed(day(2020, 1, 1), day(2020, 2, 1)).unwrap();
    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(serde_json::from_str::<IntervalSet>(&json).unwrap(), set);

    let reversed = r#"["2020-02-01T00:00:00","2020-01-01T00:00:00"]"#;
    assert!(serde_json::from_str::<IntervalSet>(reversed).is_err());
    assert_eq!(
        IntervalSet::new(vec![day(2020, 2, 1), day(2020, 1, 1)]).unwrap_err(),
        ValidationError::DescendingInstants { index: 1 }
    );
}
