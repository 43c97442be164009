//! Cycle module - Evaluation cycle aggregate and lifecycle rules.
//!
//! A Cycle is a bounded evaluation period with its own deadlines. At most
//! one cycle is OPEN at a time; while open it moves forward through the
//! ASSESSMENTS, MANAGER_REVIEWS and EQUALIZATION phases.

mod aggregate;
mod deadline_report;
mod errors;
mod phase;
mod schedule;
mod status;
pub mod validator;

pub use aggregate::{Cycle, CycleName};
pub use deadline_report::{DeadlineEntry, DeadlineReport, DeadlineStatus, URGENT_WITHIN_DAYS};
pub use errors::CycleError;
pub use phase::CyclePhase;
pub use schedule::{CycleSchedule, DateWindow, ScheduleOverrides};
pub use status::CycleStatus;
