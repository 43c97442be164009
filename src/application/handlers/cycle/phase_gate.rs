//! Phase gate - the guard other modules call before accepting phase-bound
//! writes (self assessments, manager reviews, equalization).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::cycle::{CycleError, CycleName, CyclePhase};
use crate::domain::foundation::CycleId;
use crate::ports::CycleStore;

/// What a caller learns about the active cycle when the gate passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCyclePhase {
    pub id: CycleId,
    pub name: CycleName,
    pub phase: CyclePhase,
}

/// Read-only guard over the active cycle's phase.
#[derive(Clone)]
pub struct PhaseGate {
    store: Arc<dyn CycleStore>,
}

impl PhaseGate {
    pub fn new(store: Arc<dyn CycleStore>) -> Self {
        Self { store }
    }

    /// Passes only if a cycle is OPEN and currently in `required`.
    ///
    /// # Errors
    ///
    /// - `NoActiveCycle` ("no active cycle")
    /// - `WrongPhase` ("wrong phase: current=X required=Y")
    pub async fn validate_active_cycle_phase(
        &self,
        required: CyclePhase,
    ) -> Result<ActiveCyclePhase, CycleError> {
        let cycle = self.store.find_open().await?.ok_or(CycleError::NoActiveCycle)?;

        if cycle.phase() != required {
            debug!(cycle_id = %cycle.id(), current = %cycle.phase(), required = %required, "Phase gate refused");
            return Err(CycleError::WrongPhase {
                current: cycle.phase(),
                required,
            });
        }

        Ok(ActiveCyclePhase {
            id: cycle.id(),
            name: cycle.name().clone(),
            phase: cycle.phase(),
        })
    }
}
