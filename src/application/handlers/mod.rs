//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod cycle;

pub use cycle::{
    // Commands
    ActivateCycleCommand, ActivateCycleHandler, CreateCycleCommand, CreateCycleHandler,
    UpdateCyclePhaseCommand, UpdateCyclePhaseHandler, UpdateCycleStatusCommand,
    UpdateCycleStatusHandler,
    // Queries
    GetActiveCycleHandler, GetCycleHandler, GetCycleQuery, GetDeadlineReportHandler,
    GetDeadlineReportQuery, ListCyclesHandler, ListCyclesQuery,
    // Phase gate
    ActiveCyclePhase, PhaseGate,
};
