//! GetActiveCycleHandler - Query handler returning the OPEN cycle.

use std::sync::Arc;

use crate::domain::cycle::{Cycle, CycleError};
use crate::ports::CycleStore;

/// Handler for retrieving the active cycle.
pub struct GetActiveCycleHandler {
    store: Arc<dyn CycleStore>,
}

impl GetActiveCycleHandler {
    pub fn new(store: Arc<dyn CycleStore>) -> Self {
        Self { store }
    }

    /// The OPEN cycle, or `None` between cycles.
    pub async fn handle(&self) -> Result<Option<Cycle>, CycleError> {
        Ok(self.store.find_open().await?)
    }
}
