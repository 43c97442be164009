//! In-memory adapters for tests and database-less deployments.

mod cycle_store;

pub use cycle_store::InMemoryCycleStore;
