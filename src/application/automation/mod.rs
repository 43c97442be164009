//! Time-driven cycle automation.
//!
//! `CycleAutomationPass::run_once(now)` is deterministic given `now` and the
//! store contents. The interval driver lives in `adapters::scheduler`.

mod pass;
mod report;

pub use pass::CycleAutomationPass;
pub use report::{AutomationAction, AutomationFailure, AutomationReport, AutomationStep};
