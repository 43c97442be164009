//! GetCycleHandler - Query handler for retrieving a single cycle.
//!
//! Looks a cycle up either by id or by its unique name.

use std::sync::Arc;

use crate::domain::cycle::{Cycle, CycleError};
use crate::domain::foundation::CycleId;
use crate::ports::CycleStore;

/// Query to get a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetCycleQuery {
    ById(CycleId),
    ByName(String),
}

/// Handler for retrieving cycles.
pub struct GetCycleHandler {
    store: Arc<dyn CycleStore>,
}

impl GetCycleHandler {
    pub fn new(store: Arc<dyn CycleStore>) -> Self {
        Self { store }
    }

    /// Fetches by id. Missing cycles are an error.
    pub async fn by_id(&self, id: CycleId) -> Result<Cycle, CycleError> {
        self.store
            .find_by_id(&id)
            .await?
            .ok_or(CycleError::NotFound(id))
    }

    /// Fetches by name. Missing cycles are `None`.
    pub async fn by_name(&self, name: &str) -> Result<Option<Cycle>, CycleError> {
        Ok(self.store.find_by_name(name).await?)
    }

    pub async fn handle(&self, query: GetCycleQuery) -> Result<Option<Cycle>, CycleError> {
        match query {
            GetCycleQuery::ById(id) => Ok(self.store.find_by_id(&id).await?),
            GetCycleQuery::ByName(name) => self.by_name(&name).await,
        }
    }
}
