//! Access control port for cycle administration.
//!
//! The engine never parses roles itself. Callers inject a capability check
//! and every command handler consults it before validating or writing.
//!
//! # Example
//!
//! ```ignore
//! use evaluation_cycles::ports::{AccessResult, CycleAccessChecker};
//!
//! match access_checker.can_manage_cycles(&metadata.user_id).await? {
//!     AccessResult::Allowed => { /* proceed */ }
//!     AccessResult::Denied(reason) => return Err(CycleError::AccessDenied(reason.to_string())),
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{DomainError, UserId};

/// Port for checking whether a user may run cycle administration commands.
#[async_trait]
pub trait CycleAccessChecker: Send + Sync {
    /// Check if the user may create, activate, or change the status/phase of cycles.
    async fn can_manage_cycles(&self, user_id: &UserId) -> Result<AccessResult, DomainError>;
}

/// Result of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessResult {
    /// Access is granted.
    Allowed,
    /// Access is denied with a specific reason.
    Denied(AccessDeniedReason),
}

impl AccessResult {
    /// Returns true if access is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessResult::Allowed)
    }

    /// Converts the result to a Result type, with denied becoming an error.
    pub fn into_result(self) -> Result<(), AccessDeniedReason> {
        match self {
            AccessResult::Allowed => Ok(()),
            AccessResult::Denied(reason) => Err(reason),
        }
    }
}

/// Reason why access was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessDeniedReason {
    /// The user lacks the administrator capability.
    NotAdministrator,
    /// The capability check itself could not be completed.
    CheckUnavailable { detail: String },
}

impl fmt::Display for AccessDeniedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessDeniedReason::NotAdministrator => write!(f, "user is not a cycle administrator"),
            AccessDeniedReason::CheckUnavailable { detail } => {
                write!(f, "access check unavailable: {}", detail)
            }
        }
    }
}

/// Grants every request. For single-tenant deployments and tests where
/// authorization happens upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAccess;

#[async_trait]
impl CycleAccessChecker for AllowAllAccess {
    async fn can_manage_cycles(&self, _user_id: &UserId) -> Result<AccessResult, DomainError> {
        Ok(AccessResult::Allowed)
    }
}
