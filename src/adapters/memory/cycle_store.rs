//! In-memory implementation of CycleStore.
//!
//! Holds every cycle behind one async `RwLock`. A batch is applied to a
//! copy of the map and swapped in only if every mutation and invariant
//! check succeeds, which makes `commit` all-or-nothing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::cycle::{Cycle, CycleStatus};
use crate::domain::foundation::{CycleId, DomainError, ErrorCode};
use crate::ports::{CommitOutcome, CycleBatch, CycleMutation, CycleStore};

/// In-memory CycleStore for tests, demos, and deployments without a database.
#[derive(Default)]
pub struct InMemoryCycleStore {
    cycles: RwLock<HashMap<CycleId, Cycle>>,
}

impl InMemoryCycleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with cycles, bypassing invariant checks.
    ///
    /// Intended for seeding fixtures, including deliberately inconsistent
    /// historical data.
    pub fn with_cycles(cycles: impl IntoIterator<Item = Cycle>) -> Self {
        let map = cycles.into_iter().map(|c| (c.id(), c)).collect();
        Self {
            cycles: RwLock::new(map),
        }
    }

    /// Number of stored cycles.
    pub async fn len(&self) -> usize {
        self.cycles.read().await.len()
    }

    /// Returns true if the store holds no cycles.
    pub async fn is_empty(&self) -> bool {
        self.cycles.read().await.is_empty()
    }
}

fn apply(
    working: &mut HashMap<CycleId, Cycle>,
    mutation: CycleMutation,
    outcome: &mut CommitOutcome,
) -> Result<(), DomainError> {
    match mutation {
        CycleMutation::Insert(cycle) => {
            if working.contains_key(&cycle.id()) {
                return Err(DomainError::new(
                    ErrorCode::InvariantViolation,
                    format!("Cycle already exists: {}", cycle.id()),
                ));
            }
            working.insert(cycle.id(), cycle);
        }
        CycleMutation::Update(cycle) => {
            let stored = working.get(&cycle.id()).ok_or_else(|| {
                DomainError::new(
                    ErrorCode::CycleNotFound,
                    format!("Cycle not found: {}", cycle.id()),
                )
            })?;
            if stored.version() != cycle.version() {
                return Err(stale_write(&cycle, stored.version()));
            }
            let next = bump(&cycle, cycle.version() + 1);
            working.insert(next.id(), next);
        }
        CycleMutation::CloseOpenExcept { keep, closed_at } => {
            let targets: Vec<CycleId> = working
                .values()
                .filter(|c| c.is_open() && c.id() != keep)
                .map(|c| c.id())
                .collect();
            for id in targets {
                if let Some(open) = working.get(&id) {
                    let mut closed = open.clone();
                    closed.close(closed_at).map_err(DomainError::from)?;
                    let closed = bump(&closed, open.version() + 1);
                    working.insert(id, closed);
                    outcome.demoted.push(id);
                }
            }
        }
    }
    Ok(())
}

fn bump(cycle: &Cycle, version: u64) -> Cycle {
    Cycle::reconstitute(
        cycle.id(),
        cycle.name().clone(),
        cycle.status(),
        cycle.phase(),
        *cycle.schedule(),
        version,
        cycle.created_at(),
        cycle.updated_at(),
    )
}

fn stale_write(cycle: &Cycle, actual: u64) -> DomainError {
    DomainError::new(
        ErrorCode::ConcurrentModification,
        format!("Cycle {} was modified concurrently", cycle.id()),
    )
    .with_detail("expected_version", cycle.version().to_string())
    .with_detail("actual_version", actual.to_string())
}

fn check_invariants(working: &HashMap<CycleId, Cycle>) -> Result<(), DomainError> {
    let open = working.values().filter(|c| c.is_open()).count();
    if open > 1 {
        return Err(DomainError::new(
            ErrorCode::InvariantViolation,
            format!("Batch would leave {} OPEN cycles", open),
        ));
    }

    let mut seen: HashMap<&str, CycleId> = HashMap::with_capacity(working.len());
    for cycle in working.values() {
        if let Some(other) = seen.insert(cycle.name().as_str(), cycle.id()) {
            if other != cycle.id() {
                return Err(DomainError::new(
                    ErrorCode::DuplicateCycleName,
                    format!("Cycle name already in use: {}", cycle.name()),
                )
                .with_detail("name", cycle.name().as_str()));
            }
        }
    }
    Ok(())
}

fn sort_for_listing(cycles: &mut [Cycle]) {
    cycles.sort_by(|a, b| {
        let by_start = match (a.schedule().start_date, b.schedule().start_date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        by_start.then_with(|| b.created_at().cmp(&a.created_at()))
    });
}

#[async_trait]
impl CycleStore for InMemoryCycleStore {
    async fn find_by_id(&self, id: &CycleId) -> Result<Option<Cycle>, DomainError> {
        Ok(self.cycles.read().await.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Cycle>, DomainError> {
        let name = name.trim();
        Ok(self
            .cycles
            .read()
            .await
            .values()
            .find(|c| c.name().as_str() == name)
            .cloned())
    }

    async fn find_by_status(&self, status: CycleStatus) -> Result<Vec<Cycle>, DomainError> {
        let mut found: Vec<Cycle> = self
            .cycles
            .read()
            .await
            .values()
            .filter(|c| c.status() == status)
            .cloned()
            .collect();
        found.sort_by_key(|c| (c.created_at(), c.id()));
        Ok(found)
    }

    async fn list(&self) -> Result<Vec<Cycle>, DomainError> {
        let mut all: Vec<Cycle> = self.cycles.read().await.values().cloned().collect();
        sort_for_listing(&mut all);
        Ok(all)
    }

    async fn commit(&self, batch: CycleBatch) -> Result<CommitOutcome, DomainError> {
        let mut guard = self.cycles.write().await;
        let mut working = guard.clone();
        let mut outcome = CommitOutcome::default();

        for mutation in batch.into_mutations() {
            apply(&mut working, mutation, &mut outcome)?;
        }
        check_invariants(&working)?;

        *guard = working;
        Ok(outcome)
    }
}
