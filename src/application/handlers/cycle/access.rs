//! Shared capability and activation helpers for cycle command handlers.

use tracing::{info, warn};

use crate::domain::cycle::{Cycle, CycleError};
use crate::domain::foundation::{CommandMetadata, Timestamp};
use crate::ports::{
    AccessDeniedReason, AccessResult, CommitOutcome, CycleAccessChecker, CycleBatch, CycleStore,
};

/// Fails with `AccessDenied` unless the acting user may manage cycles.
///
/// Fail-secure: an error from the checker counts as a denial.
pub(crate) async fn ensure_can_manage(
    checker: &dyn CycleAccessChecker,
    metadata: &CommandMetadata,
) -> Result<(), CycleError> {
    let result = match checker.can_manage_cycles(&metadata.user_id).await {
        Ok(result) => result,
        Err(err) => AccessResult::Denied(AccessDeniedReason::CheckUnavailable {
            detail: err.to_string(),
        }),
    };

    result.into_result().map_err(|reason| {
        warn!(user_id = %metadata.user_id, %reason, "Cycle command denied");
        CycleError::AccessDenied(reason.to_string())
    })
}

/// Commits an already-activated cycle together with the demotion of every
/// other OPEN cycle, in one store transaction.
pub(crate) async fn commit_exclusive_activation(
    store: &dyn CycleStore,
    cycle: &Cycle,
    now: Timestamp,
) -> Result<CommitOutcome, CycleError> {
    let outcome = store
        .commit(CycleBatch::exclusive_activation(cycle.clone(), now))
        .await?;

    for demoted in &outcome.demoted {
        info!(cycle_id = %demoted, replaced_by = %cycle.id(), "Closed cycle to make room for activation");
    }
    info!(
        cycle_id = %cycle.id(),
        name = %cycle.name(),
        phase = %cycle.phase(),
        "Cycle activated"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode, UserId};
    use async_trait::async_trait;

    struct Failing;

    #[async_trait]
    impl CycleAccessChecker for Failing {
        async fn can_manage_cycles(&self, _user_id: &UserId) -> Result<AccessResult, DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "directory offline"))
        }
    }

    struct Deny;

    #[async_trait]
    impl CycleAccessChecker for Deny {
        async fn can_manage_cycles(&self, _user_id: &UserId) -> Result<AccessResult, DomainError> {
            Ok(AccessResult::Denied(AccessDeniedReason::NotAdministrator))
        }
    }

    #[tokio::test]
    async fn checker_errors_deny_access() {
        let err = ensure_can_manage(&Failing, &CommandMetadata::test_fixture())
            .await
            .unwrap_err();
        assert!(matches!(err, CycleError::AccessDenied(msg) if msg.contains("directory offline")));
    }

    #[tokio::test]
    async fn denial_is_reported() {
        let err = ensure_can_manage(&Deny, &CommandMetadata::test_fixture())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CycleError::AccessDenied("user is not a cycle administrator".to_string())
        );
    }
}
