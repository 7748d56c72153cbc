//! # Error Hierarchy
//!
//! Structured error types for ClubSync, built with `thiserror`.
//!
//! Each variant carries the field or state that caused the failure so that
//! API clients and operators can act on the message without guesswork.

use thiserror::Error;

/// Top-level error type for ClubSync library code.
#[derive(Error, Debug)]
pub enum ClubSyncError {
    /// A request or record failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A lifecycle transition was rejected.
    #[error("state transition error: {0}")]
    Transition(#[from] TransitionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors for user-supplied values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was missing or blank after trimming.
    #[error("{field} is required")]
    Required {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field exceeded its length ceiling.
    #[error("{field} must not exceed {max} characters")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum permitted length in characters.
        max: usize,
    },

    /// The email address is not of the form `local@domain.tld`.
    #[error("invalid email address: \"{0}\"")]
    InvalidEmail(String),

    /// The join code is not 8 characters from `A-Z0-9`.
    #[error("invalid join code: \"{0}\" (expected 8 letters or digits)")]
    InvalidJoinCode(String),

    /// A numeric field fell outside its permitted range.
    #[error("{field} {reason}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of the violated bound.
        reason: String,
    },

    /// A free-form constraint violation.
    #[error("{0}")]
    Invalid(String),
}

impl ValidationError {
    /// The request field at fault, when the error concerns a single one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Required { field } | Self::TooLong { field, .. } => Some(*field),
            Self::OutOfRange { field, .. } => Some(*field),
            Self::InvalidEmail(_) => Some("email"),
            Self::InvalidJoinCode(_) => Some("join_code"),
            Self::Invalid(_) => None,
        }
    }
}

/// Errors raised when a lifecycle state machine refuses a transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The record already reached a terminal state.
    #[error("{kind} has already been {state}")]
    AlreadyDecided {
        /// The record type (e.g. "join request").
        kind: &'static str,
        /// The terminal state name.
        state: String,
    },

    /// The attempted transition is not in the transition table.
    #[error("invalid {kind} transition from {from} to {to}")]
    InvalidTransition {
        /// The record type.
        kind: &'static str,
        /// Current state name.
        from: String,
        /// Requested state name.
        to: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_names_the_field() {
        let err = ValidationError::Required { field: "title" };
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn too_long_names_the_limit() {
        let err = ValidationError::TooLong {
            field: "name",
            max: 120,
        };
        let msg = err.to_string();
        assert!(msg.contains("name"));
        assert!(msg.contains("120"));
    }

    #[test]
    fn out_of_range_reads_naturally() {
        let err = ValidationError::OutOfRange {
            field: "hours",
            reason: "must be greater than 0".to_string(),
        };
        assert_eq!(err.to_string(), "hours must be greater than 0");
    }

    #[test]
    fn field_names_the_culprit() {
        assert_eq!(ValidationError::Required { field: "title" }.field(), Some("title"));
        assert_eq!(
            ValidationError::InvalidJoinCode("abc".into()).field(),
            Some("join_code")
        );
        assert_eq!(ValidationError::Invalid("duplicate member".into()).field(), None);
    }

    #[test]
    fn transition_errors_display_states() {
        let err = TransitionError::AlreadyDecided {
            kind: "join request",
            state: "approved".to_string(),
        };
        assert_eq!(err.to_string(), "join request has already been approved");

        let err = TransitionError::InvalidTransition {
            kind: "task",
            from: "todo".to_string(),
            to: "todo".to_string(),
        };
        assert!(err.to_string().contains("from todo to todo"));
    }

    #[test]
    fn top_level_wraps_validation() {
        let err: ClubSyncError = ValidationError::InvalidEmail("x".to_string()).into();
        assert!(err.to_string().starts_with("validation error"));
    }
}
