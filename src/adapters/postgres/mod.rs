//! PostgreSQL adapters - Database implementations for the store port.
//!
//! - `PostgresCycleStore` - Cycle records with transactional batches

mod cycle_store;

pub use cycle_store::PostgresCycleStore;
