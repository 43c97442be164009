//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    DuplicateCycleName,
    InvalidDateOrdering,
    OverlappingCycleWindow,
    IllegalPhaseTransition,
    InvalidCycleState,
    AlreadyActive,

    // Not found errors
    CycleNotFound,

    // Phase gate errors
    NoActiveCycle,
    WrongPhase,

    // Authorization errors
    Forbidden,

    // Consistency errors
    ConcurrentModification,
    InvariantViolation,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// Returns true for errors caused by the caller's input or timing.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            ErrorCode::DatabaseError | ErrorCode::InternalError | ErrorCode::InvariantViolation
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::DuplicateCycleName => "DUPLICATE_CYCLE_NAME",
            ErrorCode::InvalidDateOrdering => "INVALID_DATE_ORDERING",
            ErrorCode::OverlappingCycleWindow => "OVERLAPPING_CYCLE_WINDOW",
            ErrorCode::IllegalPhaseTransition => "ILLEGAL_PHASE_TRANSITION",
            ErrorCode::InvalidCycleState => "INVALID_CYCLE_STATE",
            ErrorCode::AlreadyActive => "ALREADY_ACTIVE",
            ErrorCode::CycleNotFound => "CYCLE_NOT_FOUND",
            ErrorCode::NoActiveCycle => "NO_ACTIVE_CYCLE",
            ErrorCode::WrongPhase => "WRONG_PHASE",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::ConcurrentModification => "CONCURRENT_MODIFICATION",
            ErrorCode::InvariantViolation => "INVARIANT_VIOLATION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a database error wrapping an adapter failure.
    pub fn database(context: &str, err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field } | ValidationError::InvalidFormat { field, .. } => {
                field.clone()
            }
        };
        DomainError::new(ErrorCode::ValidationFailed, err.to_string()).with_detail("field", field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("name");
        assert_eq!(format!("{}", err), "Field 'name' cannot be empty");
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("status", "unknown value 'DRAFT'");
        assert_eq!(
            format!("{}", err),
            "Field 'status' has invalid format: unknown value 'DRAFT'"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::CycleNotFound, "Cycle not found");
        assert_eq!(format!("{}", err), "[CYCLE_NOT_FOUND] Cycle not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::new(ErrorCode::ConcurrentModification, "stale write")
            .with_detail("expected_version", "3")
            .with_detail("actual_version", "4");

        assert_eq!(err.details.get("expected_version"), Some(&"3".to_string()));
        assert_eq!(err.details.get("actual_version"), Some(&"4".to_string()));
    }

    #[test]
    fn validation_error_converts_with_field_detail() {
        let err: DomainError = ValidationError::empty_field("name").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field"), Some(&"name".to_string()));
    }

    #[test]
    fn client_errors_are_distinguished_from_infrastructure() {
        assert!(ErrorCode::AlreadyActive.is_client_error());
        assert!(ErrorCode::CycleNotFound.is_client_error());
        assert!(!ErrorCode::DatabaseError.is_client_error());
        assert!(!ErrorCode::InvariantViolation.is_client_error());
    }
}
