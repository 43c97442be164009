//! CreateCycleHandler - Command handler for creating new cycles.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::cycle::validator::{validate_date_consistency, validate_no_overlap};
use crate::domain::cycle::{Cycle, CycleError, CycleName, CycleSchedule};
use crate::domain::foundation::CommandMetadata;
use crate::ports::{Clock, CycleAccessChecker, CycleStore};

use super::access::ensure_can_manage;

/// Command to create a new cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCycleCommand {
    pub name: String,
    #[serde(flatten)]
    pub schedule: CycleSchedule,
}

/// Handler for creating cycles.
pub struct CreateCycleHandler {
    store: Arc<dyn CycleStore>,
    access_checker: Arc<dyn CycleAccessChecker>,
    clock: Arc<dyn Clock>,
}

impl CreateCycleHandler {
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

    /// Creates an UPCOMING cycle in the ASSESSMENTS phase.
    ///
    /// # Errors
    ///
    /// - `AccessDenied` if the user may not manage cycles
    /// - `Validation` for a blank or oversized name
    /// - `DuplicateName` if any cycle (even CLOSED) has the name
    /// - `InvalidDateOrdering` if the schedule is out of order
    /// - `OverlappingWindow` if the window intersects the OPEN cycle's window
    pub async fn handle(
        &self,
        cmd: CreateCycleCommand,
        metadata: CommandMetadata,
    ) -> Result<Cycle, CycleError> {
        ensure_can_manage(self.access_checker.as_ref(), &metadata).await?;

        let name = CycleName::new(cmd.name)?;
        if self.store.find_by_name(name.as_str()).await?.is_some() {
            return Err(CycleError::DuplicateName(name.to_string()));
        }

        validate_date_consistency(&cmd.schedule)?;

        if let Some(open) = self.store.find_open().await? {
            validate_no_overlap(&cmd.schedule, open.schedule())?;
        }

        let cycle = Cycle::new(name, cmd.schedule, self.clock.now());
        self.store.insert(&cycle).await?;

        info!(
            cycle_id = %cycle.id(),
            name = %cycle.name(),
            user_id = %metadata.user_id,
            correlation_id = %metadata.correlation_id(),
            "Cycle created"
        );
        Ok(cycle)
    }
}
