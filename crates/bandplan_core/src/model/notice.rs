//! Mailbox messages delivered to members.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Appointment field touched by a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    Venue,
    Period,
    Cost,
    Revenue,
}

impl ChangedField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Venue => "venue",
            Self::Period => "period",
            Self::Cost => "cost",
            Self::Revenue => "revenue",
        }
    }
}

/// One message in a member's mailbox.
///
/// `appointment` fields carry the appointment summary as it read when the
/// notice was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    AppointmentChanged {
        appointment: String,
        field: ChangedField,
        from: String,
        to: String,
    },
    AppointmentReverted {
        appointment: String,
    },
    AppointmentRemoved {
        appointment: String,
    },
    ProposalDeclined {
        declined_by: String,
        reason: String,
        appointment: String,
    },
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AppointmentChanged {
                appointment,
                field,
                from,
                to,
            } => write!(
                f,
                "{appointment} was changed: {}: {from} -> {to}",
                field.as_str()
            ),
            Self::AppointmentReverted { appointment } => {
                write!(f, "{appointment} was reverted to its previous version")
            }
            Self::AppointmentRemoved { appointment } => write!(f, "{appointment} was removed"),
            Self::ProposalDeclined {
                declined_by,
                reason,
                appointment,
            } => write!(f, "{declined_by}: {reason} - {appointment}"),
        }
    }
}
