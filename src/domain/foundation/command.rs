//! Command infrastructure for CQRS handlers.
//!
//! `CommandMetadata` carries the acting user and tracing context through
//! every command handler, so handlers share one parameter instead of a
//! loose list of optional strings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Metadata context for command handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// The user executing this command (required for authorization).
    pub user_id: UserId,

    /// Links related operations across a single request.
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,

    /// Source of this command (e.g., "api", "scheduler").
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    /// Creates new command metadata with required user ID.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            correlation_id: None,
            source: None,
        }
    }

    /// Metadata for writes issued by the automation scheduler.
    pub fn scheduler() -> Self {
        Self::new(UserId::system()).with_source("scheduler")
    }

    /// Builder: Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Builder: Add source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the correlation ID, generating one if not set.
    pub fn correlation_id(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Returns the source if set.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

#[cfg(test)]
impl CommandMetadata {
    /// Creates a test fixture for an administrator.
    pub fn test_fixture() -> Self {
        Self::new(UserId::new("admin-123").unwrap())
            .with_correlation_id("test-correlation-id")
            .with_source("test")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_with_user_id() {
        let user_id = UserId::new("user-123").unwrap();
        let metadata = CommandMetadata::new(user_id.clone());

        assert_eq!(metadata.user_id, user_id);
        assert!(metadata.correlation_id.is_none());
        assert!(metadata.source().is_none());
    }

    #[test]
    fn explicit_correlation_id_is_returned() {
        let metadata = CommandMetadata::new(UserId::new("u").unwrap()).with_correlation_id("corr-1");
        assert_eq!(metadata.correlation_id(), "corr-1");
    }

    #[test]
    fn correlation_id_generates_if_missing() {
        let metadata = CommandMetadata::new(UserId::new("u").unwrap());
        assert!(!metadata.correlation_id().is_empty());
    }

    #[test]
    fn scheduler_metadata_uses_system_user() {
        let metadata = CommandMetadata::scheduler();
        assert_eq!(metadata.user_id, UserId::system());
        assert_eq!(metadata.source(), Some("scheduler"));
    }

    #[test]
    fn serialization_skips_unset_fields() {
        let json = serde_json::to_string(&CommandMetadata::new(UserId::new("u").unwrap())).unwrap();
        assert!(!json.contains("correlation_id"));
        assert!(!json.contains("source"));
    }
}
