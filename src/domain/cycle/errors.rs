//! Cycle-specific error types.
//!
//! # Error Mapping
//!
//! | Error | Category | ErrorCode |
//! |-------|----------|-----------|
//! | NotFound | not-found | CYCLE_NOT_FOUND |
//! | DuplicateName | validation | DUPLICATE_CYCLE_NAME |
//! | InvalidDateOrdering | validation | INVALID_DATE_ORDERING |
//! | OverlappingWindow | validation | OVERLAPPING_CYCLE_WINDOW |
//! | IllegalPhaseTransition | validation | ILLEGAL_PHASE_TRANSITION |
//! | IllegalStatusTransition | validation | INVALID_CYCLE_STATE |
//! | InvalidState | validation | INVALID_CYCLE_STATE |
//! | AlreadyActive | validation | ALREADY_ACTIVE |
//! | NoActiveCycle / WrongPhase | phase gate | NO_ACTIVE_CYCLE / WRONG_PHASE |
//! | AccessDenied | authorization | FORBIDDEN |
//! | Store | infrastructure | as reported by the store |

use thiserror::Error;

use crate::domain::foundation::{CycleId, DomainError, ErrorCode, ValidationError};

use super::{CyclePhase, CycleStatus, DateWindow};

/// Errors raised by cycle commands, queries and the phase gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    #[error("Cycle not found: {0}")]
    NotFound(CycleId),

    #[error("A cycle named '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid date ordering: {0}")]
    InvalidDateOrdering(String),

    #[error("Cycle window {candidate} overlaps the active cycle window {active}")]
    OverlappingWindow {
        candidate: DateWindow,
        active: DateWindow,
    },

    #[error("Illegal phase transition from {current} to {requested}")]
    IllegalPhaseTransition {
        current: CyclePhase,
        requested: CyclePhase,
    },

    #[error("Illegal status transition from {current} to {requested}")]
    IllegalStatusTransition {
        current: CycleStatus,
        requested: CycleStatus,
    },

    #[error("Cycle {id} is {status}; phase changes require an OPEN cycle")]
    InvalidState { id: CycleId, status: CycleStatus },

    #[error("Cycle {0} is already active")]
    AlreadyActive(CycleId),

    #[error("no active cycle")]
    NoActiveCycle,

    #[error("wrong phase: current={current} required={required}")]
    WrongPhase {
        current: CyclePhase,
        required: CyclePhase,
    },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(DomainError),
}

impl CycleError {
    /// Maps the error onto the crate-wide error vocabulary.
    pub fn code(&self) -> ErrorCode {
        match self {
            CycleError::NotFound(_) => ErrorCode::CycleNotFound,
            CycleError::DuplicateName(_) => ErrorCode::DuplicateCycleName,
            CycleError::InvalidDateOrdering(_) => ErrorCode::InvalidDateOrdering,
            CycleError::OverlappingWindow { .. } => ErrorCode::OverlappingCycleWindow,
            CycleError::IllegalPhaseTransition { .. } => ErrorCode::IllegalPhaseTransition,
            CycleError::IllegalStatusTransition { .. } | CycleError::InvalidState { .. } => {
                ErrorCode::InvalidCycleState
            }
            CycleError::AlreadyActive(_) => ErrorCode::AlreadyActive,
            CycleError::NoActiveCycle => ErrorCode::NoActiveCycle,
            CycleError::WrongPhase { .. } => ErrorCode::WrongPhase,
            CycleError::AccessDenied(_) => ErrorCode::Forbidden,
            CycleError::Validation(_) => ErrorCode::ValidationFailed,
            CycleError::Store(err) => err.code,
        }
    }

    /// Returns true if another writer changed the record since it was read.
    pub fn is_concurrent_modification(&self) -> bool {
        self.code() == ErrorCode::ConcurrentModification
    }
}

impl From<DomainError> for CycleError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DuplicateCycleName => {
                let name = err.details.get("name").cloned().unwrap_or_default();
                CycleError::DuplicateName(name)
            }
            _ => CycleError::Store(err),
        }
    }
}

impl From<CycleError> for DomainError {
    fn from(err: CycleError) -> Self {
        match err {
            CycleError::Store(inner) => inner,
            other => DomainError::new(other.code(), other.to_string()),
        }
    }
}
