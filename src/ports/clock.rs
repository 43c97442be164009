//! Clock port.
//!
//! Time is an input to the lifecycle engine. Handlers read "now" through
//! this port so tests can pin it.

use crate::domain::foundation::Timestamp;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
