//! Cycle schedule: the active window and the per-phase deadlines.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

/// Dates bounding a cycle and its phases. Every date is optional.
///
/// When present they must satisfy
/// `start_date < assessment_deadline < manager_deadline < equalization_deadline < end_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CycleSchedule {
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub assessment_deadline: Option<Timestamp>,
    pub manager_deadline: Option<Timestamp>,
    pub equalization_deadline: Option<Timestamp>,
}

impl CycleSchedule {
    /// The `[start_date, end_date]` window, when both ends are set.
    pub fn window(&self) -> Option<DateWindow> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(DateWindow { start, end }),
            _ => None,
        }
    }

    /// Returns a copy with every field present in `overrides` replacing ours.
    pub fn merged_with(&self, overrides: &ScheduleOverrides) -> CycleSchedule {
        CycleSchedule {
            start_date: overrides.start_date.or(self.start_date),
            end_date: overrides.end_date.or(self.end_date),
            assessment_deadline: overrides.assessment_deadline.or(self.assessment_deadline),
            manager_deadline: overrides.manager_deadline.or(self.manager_deadline),
            equalization_deadline: overrides
                .equalization_deadline
                .or(self.equalization_deadline),
        }
    }

    /// Builder: set the start date.
    pub fn with_start(mut self, at: Timestamp) -> Self {
        self.start_date = Some(at);
        self
    }

    /// Builder: set the end date.
    pub fn with_end(mut self, at: Timestamp) -> Self {
        self.end_date = Some(at);
        self
    }

    /// Builder: set the three phase deadlines.
    pub fn with_deadlines(
        mut self,
        assessment: Timestamp,
        manager: Timestamp,
        equalization: Timestamp,
    ) -> Self {
        self.assessment_deadline = Some(assessment);
        self.manager_deadline = Some(manager);
        self.equalization_deadline = Some(equalization);
        self
    }
}

/// Admin-supplied replacements applied when a cycle is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleOverrides {
    #[serde(default)]
    pub start_date: Option<Timestamp>,
    #[serde(default)]
    pub end_date: Option<Timestamp>,
    #[serde(default)]
    pub assessment_deadline: Option<Timestamp>,
    #[serde(default)]
    pub manager_deadline: Option<Timestamp>,
    #[serde(default)]
    pub equalization_deadline: Option<Timestamp>,
}

/// Closed interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl DateWindow {
    /// Returns true if the two closed intervals share at least one instant.
    pub fn intersects(&self, other: &DateWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
