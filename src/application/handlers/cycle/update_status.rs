//! UpdateCycleStatusHandler - Command handler for manual status changes.
//!
//! Opening a cycle goes through the same demote-then-promote commit as
//! activation but leaves the schedule alone. Setting the status a cycle
//! already has is a no-op.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::cycle::{Cycle, CycleError, CycleStatus};
use crate::domain::foundation::{CommandMetadata, CycleId};
use crate::ports::{Clock, CycleAccessChecker, CycleStore};

use super::access::{commit_exclusive_activation, ensure_can_manage};

/// Command to set a cycle's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCycleStatusCommand {
    pub cycle_id: CycleId,
    pub status: CycleStatus,
}

/// Handler for manual status changes.
pub struct UpdateCycleStatusHandler {
    store: Arc<dyn CycleStore>,
    access_checker: Arc<dyn CycleAccessChecker>,
    clock: Arc<dyn Clock>,
}

impl UpdateCycleStatusHandler {
    pub fn new(
        store: Arc<dyn CycleStore>,
        access_checker: Arc<dyn CycleAccessChecker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            access_checker,
            clock,
        }
    }

    /// # Errors
    ///
    /// - `AccessDenied` if the user may not manage cycles
    /// - `NotFound` if the cycle doesn't exist
    /// - `IllegalStatusTransition` for UPCOMING -> CLOSED or any move out of CLOSED
    pub async fn handle(
        &self,
        cmd: UpdateCycleStatusCommand,
        metadata: CommandMetadata,
    ) -> Result<Cycle, CycleError> {
        ensure_can_manage(self.access_checker.as_ref(), &metadata).await?;

        let mut cycle = self
            .store
            .find_by_id(&cmd.cycle_id)
            .await?
            .ok_or(CycleError::NotFound(cmd.cycle_id))?;

        if cycle.status() == cmd.status {
            debug!(cycle_id = %cycle.id(), status = %cmd.status, "Status unchanged");
            return Ok(cycle);
        }

        let now = self.clock.now();
        match cmd.status {
            CycleStatus::Open => {
                cycle.activate(None, now)?;
                commit_exclusive_activation(self.store.as_ref(), &cycle, now).await?;
            }
            CycleStatus::Closed => {
                cycle.close(now)?;
                self.store.update(&cycle).await?;
                info!(cycle_id = %cycle.id(), user_id = %metadata.user_id, "Cycle closed");
            }
            CycleStatus::Upcoming => {
                return Err(CycleError::IllegalStatusTransition {
                    current: cycle.status(),
                    requested: CycleStatus::Upcoming,
                });
            }
        }

        self.store
            .find_by_id(&cmd.cycle_id)
            .await?
            .ok_or(CycleError::NotFound(cmd.cycle_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryCycleStore;
    use crate::application::handlers::cycle::test_support::*;
    use crate::domain::cycle::{CyclePhase, CycleSchedule};

    fn handler(store: Arc<InMemoryCycleStore>) -> UpdateCycleStatusHandler {
        UpdateCycleStatusHandler::new(store, allow_all(), clock_at(day(2025, 1, 10)))
    }

    fn cmd(cycle: &Cycle, status: CycleStatus) -> UpdateCycleStatusCommand {
        UpdateCycleStatusCommand {
            cycle_id: cycle.id(),
            status,
        }
    }

    #[tokio::test]
    async fn opening_swaps_the_active_cycle_without_touching_dates() {
        let previous = open_cycle("2024.2", q4_2024_schedule());
        let next = upcoming_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([previous.clone(), next.clone()]));

        let opened = handler(store.clone())
            .handle(cmd(&next, CycleStatus::Open), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(opened.status(), CycleStatus::Open);
        assert_eq!(opened.schedule(), next.schedule());
        assert_eq!(opened.phase(), CyclePhase::Assessments);
        let previous_now = store.find_by_id(&previous.id()).await.unwrap().unwrap();
        assert_eq!(previous_now.status(), CycleStatus::Closed);
    }

    #[tokio::test]
    async fn closing_an_open_cycle() {
        let open = open_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([open.clone()]));

        let closed = handler(store.clone())
            .handle(cmd(&open, CycleStatus::Closed), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(closed.status(), CycleStatus::Closed);
        assert!(store.find_open().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn same_status_is_a_no_op() {
        let open = open_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([open.clone()]));

        let result = handler(store.clone())
            .handle(cmd(&open, CycleStatus::Open), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(result, open);
        assert_eq!(store.find_by_id(&open.id()).await.unwrap(), Some(open));
    }

    #[tokio::test]
    async fn closed_is_terminal() {
        let closed = closed_cycle("2024.1", CycleSchedule::default());
        let store = Arc::new(InMemoryCycleStore::with_cycles([closed.clone()]));

        for status in [CycleStatus::Open, CycleStatus::Upcoming] {
            let result = handler(store.clone())
                .handle(cmd(&closed, status), CommandMetadata::test_fixture())
                .await;
            assert!(matches!(
                result,
                Err(CycleError::IllegalStatusTransition {
                    current: CycleStatus::Closed,
                    ..
                })
            ));
        }
        assert_eq!(store.find_by_id(&closed.id()).await.unwrap(), Some(closed));
    }

    #[tokio::test]
    async fn upcoming_cannot_skip_to_closed() {
        let upcoming = upcoming_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([upcoming.clone()]));

        let result = handler(store)
            .handle(cmd(&upcoming, CycleStatus::Closed), CommandMetadata::test_fixture())
            .await;

        assert!(matches!(result, Err(CycleError::IllegalStatusTransition { .. })));
    }

    #[tokio::test]
    async fn missing_cycle_is_not_found() {
        let store = Arc::new(InMemoryCycleStore::new());
        let id = CycleId::new();

        let result = handler(store)
            .handle(
                UpdateCycleStatusCommand {
                    cycle_id: id,
                    status: CycleStatus::Closed,
                },
                CommandMetadata::test_fixture(),
            )
            .await;

        assert_eq!(result, Err(CycleError::NotFound(id)));
    }
}
