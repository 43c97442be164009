//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-memory cycle store
//! - `postgres` - PostgreSQL cycle store
//! - `scheduler` - Interval driver for the automation pass
//! - `clock` - System and fixed clocks

mod clock;
pub mod memory;
pub mod postgres;
pub mod scheduler;

pub use clock::{FixedClock, SystemClock};
pub use memory::InMemoryCycleStore;
pub use postgres::PostgresCycleStore;
pub use scheduler::{CycleAutomationScheduler, SchedulerConfig};
