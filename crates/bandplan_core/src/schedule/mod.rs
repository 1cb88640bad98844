//! Consensus scheduling of appointments.
//!
//! # Responsibility
//! - Keep the canonical appointment collection of a band.
//! - Gate every appointment with participants behind a proposal that all
//!   participants accept.
//! - Check substitute attendance before a performance is proposed.
//!
//! # Invariants
//! - Appointments with participants enter the canonical collection only
//!   through a fully accepted proposal.
//! - A proposal is terminal once accepted or retracted.
//!
//! # See also
//! - `model::appointment` for mutation and undo of single appointments.

pub mod appointments;
pub mod eligibility;
pub mod proposal;

use crate::model::member::MemberId;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// A substitute attended too few rehearsals before a performance.
    BelowAttendanceThreshold {
        member: MemberId,
        attended: usize,
        required: u32,
    },
    /// Vote on a proposal that was already accepted or retracted.
    ProposalAlreadyResolved,
    /// Appointments with participants must go through a proposal.
    ConsensusRequired,
    Validation(ValidationError),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BelowAttendanceThreshold {
                member,
                attended,
                required,
            } => write!(
                f,
                "substitute {member} attended {attended} of {required} required rehearsals"
            ),
            Self::ProposalAlreadyResolved => write!(f, "proposal is already resolved"),
            Self::ConsensusRequired => {
                write!(f, "appointments with participants need an accepted proposal")
            }
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::BelowAttendanceThreshold { .. }
            | Self::ProposalAlreadyResolved
            | Self::ConsensusRequired => None,
        }
    }
}

impl From<ValidationError> for ScheduleError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
