//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and the state machine
//! trait that form the vocabulary of the evaluation cycle domain.

mod command;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CycleId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
