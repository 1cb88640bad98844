//! Input validation errors shared by the domain records.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Interval boundary at `index` precedes the one before it.
    DescendingInstants { index: usize },
    /// Money amounts must be finite and non-negative.
    InvalidAmount { field: &'static str, value: f64 },
    /// Required text input is empty after trimming.
    EmptyField(&'static str),
    /// The same member was listed twice as participant.
    DuplicateParticipant(Uuid),
    /// Appointments need a bounded period with start and end.
    MissingPeriodBounds,
    /// Proposals need at least one participant to vote on them.
    NoParticipants,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DescendingInstants { index } => {
                write!(f, "instant at position {index} precedes its predecessor")
            }
            Self::InvalidAmount { field, value } => {
                write!(f, "{field} must be a finite amount >= 0, got {value}")
            }
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::DuplicateParticipant(id) => write!(f, "participant listed twice: {id}"),
            Self::MissingPeriodBounds => write!(f, "appointment period needs a start and an end"),
            Self::NoParticipants => write!(f, "proposal needs at least one participant"),
        }
    }
}

impl Error for ValidationError {}

/// Checks that `value` is a usable money amount.
pub(crate) fn check_amount(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::InvalidAmount { field, value })
    }
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{check_amount, require_text, ValidationError};

    #[test]
    fn check_amount_rejects_negative_and_nan() {
        assert_eq!(check_amount("cost", 12.5), Ok(12.5));
        assert!(matches!(
            check_amount("cost", -1.0),
            Err(ValidationError::InvalidAmount { field: "cost", .. })
        ));
        assert!(check_amount("revenue", f64::NAN).is_err());
    }

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("name", "  Anna ").as_deref(), Ok("Anna"));
        assert_eq!(
            require_text("name", "   "),
            Err(ValidationError::EmptyField("name"))
        );
    }
}
