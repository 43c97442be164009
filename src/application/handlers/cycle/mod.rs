//! Cycle command and query handlers.
//!
//! Handlers for cycle lifecycle operations, queries and the phase gate.

mod access;

// Command handlers
mod activate_cycle;
mod create_cycle;
mod update_phase;
mod update_status;

// Query handlers
mod get_active_cycle;
mod get_cycle;
mod get_deadline_report;
mod list_cycles;
mod phase_gate;

pub(crate) use access::commit_exclusive_activation;

pub use activate_cycle::{
    derive_activation_schedule, ActivateCycleCommand, ActivateCycleHandler,
    DEFAULT_END_DATE_GRACE_DAYS, MAX_END_DATE_GRACE_DAYS,
};
pub use create_cycle::{CreateCycleCommand, CreateCycleHandler};
pub use update_phase::{UpdateCyclePhaseCommand, UpdateCyclePhaseHandler};
pub use update_status::{UpdateCycleStatusCommand, UpdateCycleStatusHandler};

// Query handlers
pub use get_active_cycle::GetActiveCycleHandler;
pub use get_cycle::{GetCycleHandler, GetCycleQuery};
pub use get_deadline_report::{GetDeadlineReportHandler, GetDeadlineReportQuery};
pub use list_cycles::{ListCyclesHandler, ListCyclesQuery};
pub use phase_gate::{ActiveCyclePhase, PhaseGate};
