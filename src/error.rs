//! Error types for the scheduling engine.
//!
//! Configuration problems are reported as a list of
//! [`ValidationError`](crate::validation::ValidationError) wrapped in
//! [`SchedulingError::InvalidConfiguration`]. Conditions that have no effect
//! (deleting an unknown assignment, auto-filling without gaps) are not
//! errors; they come back as typed outcomes from the operation itself.

use chrono::NaiveDate;
use thiserror::Error;

use crate::validation::ValidationError;

/// Main error type for the engine.
#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Invalid configuration: {}", summarize(.0))]
    InvalidConfiguration(Vec<ValidationError>),

    #[error("Unknown employee: {0}")]
    UnknownEmployee(String),

    #[error("Unknown shift template: {0}")]
    UnknownTemplate(String),

    #[error("Unknown suggestion: {0}")]
    UnknownSuggestion(String),

    #[error("Leave for employee {employee_id} starts {start} after it ends {end}")]
    InvalidLeave {
        employee_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Date {date} is outside the session week starting {week_start}")]
    OutsideWeek { date: NaiveDate, week_start: NaiveDate },

    #[error("Shared session for {business_unit} week {week_start} cannot change weeks")]
    SessionPinned {
        business_unit: String,
        week_start: NaiveDate,
    },

    #[error("Failed to parse engine configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Repository error: {0}")]
    Repository(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, SchedulingError>;

impl SchedulingError {
    /// Validation errors carried by an `InvalidConfiguration` error.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::InvalidConfiguration(errors) => errors,
            _ => &[],
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_invalid_configuration_message() {
        let err = SchedulingError::InvalidConfiguration(vec![
            ValidationError::new(ValidationErrorKind::UnknownArea, "Requirement 'R1' references unknown area 'X'"),
            ValidationError::new(ValidationErrorKind::NegativeCount, "Requirement 'R2' has negative minimum -1"),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: Requirement 'R1' references unknown area 'X' (and 1 more)"
        );
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn test_other_errors_have_no_validation_details() {
        let err = SchedulingError::UnknownEmployee("E9".into());
        assert_eq!(err.to_string(), "Unknown employee: E9");
        assert!(err.validation_errors().is_empty());
    }
}
