//! Background scheduling of the automation pass.

mod automation_scheduler;

pub use automation_scheduler::{CycleAutomationScheduler, SchedulerConfig};
