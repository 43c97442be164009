//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the cycle engine and the outside world. Adapters implement these ports.
//!
//! - `CycleStore` - Persistence with atomic multi-record batches
//! - `Clock` - Source of "now"
//! - `CycleAccessChecker` - Injected capability check for admin commands

mod access_checker;
mod clock;
mod cycle_store;

pub use access_checker::{AccessDeniedReason, AccessResult, AllowAllAccess, CycleAccessChecker};
pub use clock::Clock;
pub use cycle_store::{CommitOutcome, CycleBatch, CycleMutation, CycleStore};
