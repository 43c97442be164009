//! UpdateCyclePhaseHandler - Command handler for manual phase changes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::cycle::{Cycle, CycleError, CyclePhase};
use crate::domain::foundation::{CommandMetadata, CycleId};
use crate::ports::{Clock, CycleAccessChecker, CycleStore};

use super::access::ensure_can_manage;

/// Command to move an OPEN cycle to its next phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCyclePhaseCommand {
    pub cycle_id: CycleId,
    pub phase: CyclePhase,
}

/// Handler for manual phase changes.
pub struct UpdateCyclePhaseHandler {
    store: Arc<dyn CycleStore>,
    access_checker: Arc<dyn CycleAccessChecker>,
    clock: Arc<dyn Clock>,
}

impl UpdateCyclePhaseHandler {
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
    /// - `InvalidState` if the cycle is not OPEN
    /// - `IllegalPhaseTransition` unless `phase` is the immediate successor
    pub async fn handle(
        &self,
        cmd: UpdateCyclePhaseCommand,
        metadata: CommandMetadata,
    ) -> Result<Cycle, CycleError> {
        ensure_can_manage(self.access_checker.as_ref(), &metadata).await?;

        let mut cycle = self
            .store
            .find_by_id(&cmd.cycle_id)
            .await?
            .ok_or(CycleError::NotFound(cmd.cycle_id))?;

        let from = cycle.phase();
        cycle.advance_phase(cmd.phase, self.clock.now())?;
        self.store.update(&cycle).await?;

        info!(
            cycle_id = %cycle.id(),
            from = %from,
            to = %cmd.phase,
            user_id = %metadata.user_id,
            "Cycle phase changed"
        );

        self.store
            .find_by_id(&cmd.cycle_id)
            .await?
            .ok_or(CycleError::NotFound(cmd.cycle_id))
    }
}
