//! ListCyclesHandler - Query handler listing every cycle.

use std::sync::Arc;

use crate::domain::cycle::{Cycle, CycleError, CycleStatus};
use crate::ports::CycleStore;

/// Query to list cycles, optionally filtered by status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCyclesQuery {
    pub status: Option<CycleStatus>,
}

/// Handler for listing cycles.
///
/// Ordering is the store's: newest start date first, undated cycles last.
pub struct ListCyclesHandler {
    store: Arc<dyn CycleStore>,
}

impl ListCyclesHandler {
    pub fn new(store: Arc<dyn CycleStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListCyclesQuery) -> Result<Vec<Cycle>, CycleError> {
        let cycles = self.store.list().await?;
        Ok(match query.status {
            Some(status) => cycles.into_iter().filter(|c| c.status() == status).collect(),
            None => cycles,
        })
    }
}
