//! Rehearsal and performance venues.

use crate::model::validation::{require_text, ValidationError};
use crate::selection::{Selection, Selector};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    name: String,
    facilities: Vec<String>,
}

impl Venue {
    /// # Errors
    /// - `EmptyField` when `name` is blank.
    pub fn new(name: &str, facilities: Vec<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require_text("venue name", name)?,
            facilities,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn facilities(&self) -> &[String] {
        &self.facilities
    }

    /// `name [facility, ...]`.
    pub fn detail(&self) -> String {
        format!("{} [{}]", self.name, self.facilities.join(", "))
    }
}

impl Display for Venue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Matches venue names, either exactly (ignoring case) or by substring.
#[derive(Debug, Clone)]
pub struct VenueNameSelector {
    name: String,
    substring: bool,
}

impl VenueNameSelector {
    pub fn exact(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            substring: false,
        }
    }

    /// Case-sensitive substring match.
    pub fn containing(fragment: impl Into<String>) -> Self {
        Self {
            name: fragment.into(),
            substring: true,
        }
    }
}

impl Selector<Venue> for VenueNameSelector {
    fn select(&self, item: &Venue) -> bool {
        if self.substring {
            item.name.contains(self.name.as_str())
        } else {
            item.name.eq_ignore_ascii_case(&self.name)
        }
    }
}

/// Matches venues offering a facility, ignoring case.
#[derive(Debug, Clone)]
pub struct FacilitySelector {
    facility: String,
}

impl FacilitySelector {
    pub fn new(facility: impl Into<String>) -> Self {
        Self {
            facility: facility.into(),
        }
    }
}

impl Selector<Venue> for FacilitySelector {
    fn select(&self, item: &Venue) -> bool {
        item.facilities
            .iter()
            .any(|facility| facility.eq_ignore_ascii_case(&self.facility))
    }
}

pub type Venues = Selection<Venue>;
