//! Cycle store port.
//!
//! Defines the contract for persisting and retrieving Cycle aggregates.
//! Implementations handle the actual storage and own the transaction
//! boundary.
//!
//! # Design
//!
//! - **Batches are atomic**: `commit` applies every mutation or none.
//!   Readers never observe a half-applied batch.
//! - **Optimistic writes**: `Update` carries the version the writer read.
//!   A mismatch fails the whole batch with `ConcurrentModification`.
//! - **Invariant backstop**: a batch that would leave two OPEN cycles or a
//!   duplicate name is rejected by the store even if a caller forgot to check.

use async_trait::async_trait;

use crate::domain::cycle::{Cycle, CycleStatus};
use crate::domain::foundation::{CycleId, DomainError, Timestamp};

/// A single write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleMutation {
    /// Persist a new cycle. Fails with `DuplicateCycleName` on a name clash.
    Insert(Cycle),

    /// Overwrite an existing cycle if its persisted version still equals
    /// `cycle.version()`. The stored version becomes `cycle.version() + 1`.
    Update(Cycle),

    /// Set status CLOSED on every OPEN cycle except `keep`.
    CloseOpenExcept { keep: CycleId, closed_at: Timestamp },
}

/// Ordered list of mutations applied in one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleBatch {
    mutations: Vec<CycleMutation>,
}

impl CycleBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// The activation swap: demote every other OPEN cycle, then write the
    /// already-activated `cycle`.
    pub fn exclusive_activation(cycle: Cycle, at: Timestamp) -> Self {
        Self::new()
            .close_open_except(cycle.id(), at)
            .update(cycle)
    }

    pub fn insert(mut self, cycle: Cycle) -> Self {
        self.mutations.push(CycleMutation::Insert(cycle));
        self
    }

    pub fn update(mut self, cycle: Cycle) -> Self {
        self.mutations.push(CycleMutation::Update(cycle));
        self
    }

    pub fn close_open_except(mut self, keep: CycleId, closed_at: Timestamp) -> Self {
        self.mutations
            .push(CycleMutation::CloseOpenExcept { keep, closed_at });
        self
    }

    pub fn mutations(&self) -> &[CycleMutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<CycleMutation> {
        self.mutations
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// What a committed batch did beyond the explicit writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Cycles demoted to CLOSED by `CloseOpenExcept`.
    pub demoted: Vec<CycleId>,
}

/// Persistence port for Cycle records.
#[async_trait]
pub trait CycleStore: Send + Sync {
    /// Find a cycle by its ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &CycleId) -> Result<Option<Cycle>, DomainError>;

    /// Find a cycle by its exact (trimmed) name, any status.
    async fn find_by_name(&self, name: &str) -> Result<Option<Cycle>, DomainError>;

    /// Find all cycles with the given status, oldest first.
    async fn find_by_status(&self, status: CycleStatus) -> Result<Vec<Cycle>, DomainError>;

    /// List every cycle, newest start date first; undated cycles last.
    async fn list(&self) -> Result<Vec<Cycle>, DomainError>;

    /// Apply the batch atomically.
    ///
    /// # Errors
    ///
    /// - `CycleNotFound` if an `Update` targets a missing cycle
    /// - `ConcurrentModification` if an `Update` carries a stale version
    /// - `DuplicateCycleName` if an `Insert` or `Update` clashes on name
    /// - `InvariantViolation` if the result would hold two OPEN cycles
    /// - `DatabaseError` on persistence failure
    async fn commit(&self, batch: CycleBatch) -> Result<CommitOutcome, DomainError>;

    /// Persist a single new cycle.
    async fn insert(&self, cycle: &Cycle) -> Result<(), DomainError> {
        self.commit(CycleBatch::new().insert(cycle.clone()))
            .await
            .map(|_| ())
    }

    /// Update a single cycle with an optimistic version check.
    async fn update(&self, cycle: &Cycle) -> Result<(), DomainError> {
        self.commit(CycleBatch::new().update(cycle.clone()))
            .await
            .map(|_| ())
    }

    /// The OPEN cycle, if any.
    async fn find_open(&self) -> Result<Option<Cycle>, DomainError> {
        Ok(self
            .find_by_status(CycleStatus::Open)
            .await?
            .into_iter()
            .next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::{CycleName, CycleSchedule};

    // Trait object safety test
    #[test]
    fn cycle_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn CycleStore) {}
    }

    #[test]
    fn exclusive_activation_demotes_before_promoting() {
        let now = Timestamp::now();
        let cycle = Cycle::new(CycleName::new("2025.1").unwrap(), CycleSchedule::default(), now);
        let id = cycle.id();

        let batch = CycleBatch::exclusive_activation(cycle.clone(), now);

        assert_eq!(
            batch.mutations(),
            &[
                CycleMutation::CloseOpenExcept { keep: id, closed_at: now },
                CycleMutation::Update(cycle),
            ]
        );
    }

    #[test]
    fn empty_batch_reports_empty() {
        assert!(CycleBatch::new().is_empty());
    }
}
