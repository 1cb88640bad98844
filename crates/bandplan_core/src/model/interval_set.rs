//! Unions of closed time intervals with an optional unbounded tail.
//!
//! # Invariants
//! - Instants are stored non-descending.
//! - Instants pair up as closed intervals `[t0, t1]`, `[t2, t3]`, ...
//! - An odd trailing instant `t` stands for the unbounded interval `[t, +inf)`.
//! - No instants at all is the universal set: every instant is in it and it
//!   contains every other interval set.

use crate::model::validation::ValidationError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Point in time used throughout the domain model.
pub type Instant = NaiveDateTime;

const DISPLAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Instant>", into = "Vec<Instant>")]
pub struct IntervalSet {
    instants: Vec<Instant>,
}

impl IntervalSet {
    /// Builds an interval set from boundary instants.
    ///
    /// # Errors
    /// - `DescendingInstants` when an instant precedes the one before it.
    pub fn new(instants: Vec<Instant>) -> Result<Self, ValidationError> {
        if let Some(index) = instants.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(ValidationError::DescendingInstants { index: index + 1 });
        }
        Ok(Self { instants })
    }

    /// The set containing every instant.
    pub fn universal() -> Self {
        Self::default()
    }

    /// One closed interval `[start, end]`.
    ///
    /// # Errors
    /// - `DescendingInstants` when `end` is before `start`.
    pub fn closed(start: Instant, end: Instant) -> Result<Self, ValidationError> {
        Self::new(vec![start, end])
    }

    /// The unbounded interval `[start, +inf)`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            instants: vec![start],
        }
    }

    pub fn is_universal(&self) -> bool {
        self.instants.is_empty()
    }

    /// Returns `true` when the last interval has no end.
    pub fn is_unbounded(&self) -> bool {
        self.instants.len() % 2 == 1
    }

    pub fn first(&self) -> Option<Instant> {
        self.instants.first().copied()
    }

    pub fn last(&self) -> Option<Instant> {
        self.instants.last().copied()
    }

    pub fn instants(&self) -> &[Instant] {
        &self.instants
    }

    /// Returns `true` when `instant` lies in any interval of this set.
    pub fn point_in(&self, instant: Instant) -> bool {
        if self.is_universal() {
            return true;
        }
        if self
            .closed_pairs()
            .any(|(start, end)| start <= instant && instant <= end)
        {
            return true;
        }
        self.open_tail().is_some_and(|start| start <= instant)
    }

    /// Returns `true` when `other` lies inside this set.
    ///
    /// Every closed interval of `other` must fit inside one interval of
    /// `self`; two adjacent intervals of `self` do not merge. An unbounded
    /// tail of `other` needs an unbounded tail of `self` starting no later.
    pub fn contains(&self, other: &IntervalSet) -> bool {
        if self.is_universal() {
            return true;
        }
        if other.is_universal() {
            return false;
        }
        if !other
            .closed_pairs()
            .all(|(start, end)| self.contains_closed(start, end))
        {
            return false;
        }
        match other.open_tail() {
            Some(start) => self.contains_open(start),
            None => true,
        }
    }

    /// Renders the set as `[a - b, c - ]` using `format` for each instant.
    pub fn render_with(&self, format: impl Fn(&Instant) -> String) -> String {
        let mut parts: Vec<String> = self
            .closed_pairs()
            .map(|(start, end)| format!("{} - {}", format(&start), format(&end)))
            .collect();
        if let Some(start) = self.open_tail() {
            parts.push(format!("{} - ", format(&start)));
        }
        format!("[{}]", parts.join(", "))
    }

    /// Renders the set with a `chrono` strftime pattern.
    pub fn render(&self, pattern: &str) -> String {
        self.render_with(|instant| instant.format(pattern).to_string())
    }

    fn closed_pairs(&self) -> impl Iterator<Item = (Instant, Instant)> + '_ {
        self.instants
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
    }

    fn open_tail(&self) -> Option<Instant> {
        if self.is_unbounded() {
            self.last()
        } else {
            None
        }
    }

    fn contains_closed(&self, start: Instant, end: Instant) -> bool {
        if self
            .closed_pairs()
            .any(|(from, to)| from <= start && end <= to)
        {
            return true;
        }
        self.contains_open(start)
    }

    fn contains_open(&self, start: Instant) -> bool {
        self.open_tail().is_some_and(|from| from <= start)
    }
}

impl TryFrom<Vec<Instant>> for IntervalSet {
    type Error = ValidationError;

    fn try_from(value: Vec<Instant>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IntervalSet> for Vec<Instant> {
    fn from(value: IntervalSet) -> Self {
        value.instants
    }
}

impl Display for IntervalSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(DISPLAY_FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::{Instant, IntervalSet};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    fn day(year: i32, month: u32, day: u32) -> Instant {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid test date")
    }

    fn set(instants: &[Instant]) -> IntervalSet {
        IntervalSet::new(instants.to_vec()).expect("ascending instants")
    }

    #[test]
    fn new_rejects_descending_instants() {
        let err = IntervalSet::new(vec![day(2020, 2, 1), day(2020, 1, 1)]).unwrap_err();
        assert_eq!(err, ValidationError::DescendingInstants { index: 1 });
    }

    #[test]
    fn point_in_uses_inclusive_bounds() {
        let january = set(&[day(2020, 1, 1), day(2020, 1, 31)]);
        assert!(january.point_in(day(2020, 1, 1)));
        assert!(january.point_in(day(2020, 1, 31)));
        assert!(!january.point_in(day(2020, 2, 1)));
    }

    #[test]
    fn contains_accepts_open_tail_inside_open_tail() {
        let from_june = IntervalSet::starting_at(day(2020, 6, 1));
        assert!(from_june.contains(&IntervalSet::starting_at(day(2020, 7, 1))));
        assert!(!from_june.contains(&IntervalSet::starting_at(day(2020, 5, 1))));
    }

    #[test]
    fn closed_set_never_contains_open_tail() {
        let year = set(&[day(2020, 1, 1), day(2020, 12, 31)]);
        assert!(!year.contains(&IntervalSet::starting_at(day(2020, 6, 1))));
    }

    #[test]
    fn open_tail_of_self_contains_later_closed_intervals() {
        let mixed = set(&[day(2020, 1, 1), day(2020, 1, 5), day(2020, 3, 1)]);
        assert!(mixed.contains(&set(&[day(2020, 4, 1), day(2020, 4, 2)])));
        assert!(!mixed.contains(&set(&[day(2020, 2, 1), day(2020, 2, 2)])));
    }

    #[test]
    fn render_with_lists_pairs_and_open_tail() {
        let mixed = set(&[day(2020, 1, 1), day(2020, 1, 5), day(2020, 3, 1)]);
        assert_eq!(mixed.render("%d.%m.%Y"), "[01.01.2020 - 05.01.2020, 01.03.2020 - ]");
        assert_eq!(
            IntervalSet::starting_at(day(2020, 3, 1)).to_string(),
            "[2020-03-01 - ]"
        );
        assert_eq!(IntervalSet::universal().to_string(), "[]");
    }
}
