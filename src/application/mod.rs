//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Admin commands and the automation pass both commit through the same
//! store batches, so they preserve the same invariants.

pub mod automation;
pub mod handlers;
mod lifecycle_service;

pub use automation::{
    AutomationAction, AutomationFailure, AutomationReport, AutomationStep, CycleAutomationPass,
};
pub use handlers::{
    ActivateCycleCommand, ActiveCyclePhase, CreateCycleCommand, GetCycleQuery, PhaseGate,
};
pub use lifecycle_service::CycleLifecycleService;
