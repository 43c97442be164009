//! Record of what one automation pass did.

use serde::{Deserialize, Serialize};

use crate::domain::cycle::{CycleError, CyclePhase};
use crate::domain::foundation::{CycleId, DomainError, ErrorCode, Timestamp};

/// The three sweeps of a pass, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationStep {
    Activate,
    AdvancePhase,
    Close,
}

/// A transition the pass committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationAction {
    Activated {
        cycle_id: CycleId,
    },
    /// An OPEN cycle closed to make room for `replaced_by`.
    ClosedForActivation {
        cycle_id: CycleId,
        replaced_by: CycleId,
    },
    PhaseAdvanced {
        cycle_id: CycleId,
        from: CyclePhase,
        to: CyclePhase,
    },
    Closed {
        cycle_id: CycleId,
    },
}

/// A cycle, or a whole sweep, the pass could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationFailure {
    /// `None` when the sweep failed before reaching any cycle.
    pub cycle_id: Option<CycleId>,
    pub step: AutomationStep,
    pub code: ErrorCode,
    pub message: String,
}

impl AutomationFailure {
    pub fn new(cycle_id: CycleId, step: AutomationStep, err: &CycleError) -> Self {
        Self {
            cycle_id: Some(cycle_id),
            step,
            code: err.code(),
            message: err.to_string(),
        }
    }

    pub fn sweep(step: AutomationStep, err: &DomainError) -> Self {
        Self {
            cycle_id: None,
            step,
            code: err.code,
            message: err.to_string(),
        }
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationReport {
    /// The instant the pass evaluated triggers against.
    pub now: Timestamp,
    pub actions: Vec<AutomationAction>,
    pub failures: Vec<AutomationFailure>,
    /// Cycles left alone because another writer got there first.
    pub conflicts: Vec<CycleId>,
}

impl AutomationReport {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now,
            actions: Vec::new(),
            failures: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    /// True if the pass committed nothing.
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub(crate) fn record(&mut self, action: AutomationAction) {
        self.actions.push(action);
    }

    pub(crate) fn record_failure(&mut self, failure: AutomationFailure) {
        self.failures.push(failure);
    }

    pub(crate) fn record_conflict(&mut self, cycle_id: CycleId) {
        self.conflicts.push(cycle_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_noop() {
        let report = AutomationReport::new(Timestamp::now());
        assert!(report.is_noop());
        assert!(!report.has_failures());
    }

    #[test]
    fn actions_serialize_with_type_tag() {
        let action = AutomationAction::PhaseAdvanced {
            cycle_id: CycleId::new(),
            from: CyclePhase::Assessments,
            to: CyclePhase::ManagerReviews,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "PHASE_ADVANCED");
        assert_eq!(json["to"], "MANAGER_REVIEWS");
    }

    #[test]
    fn failure_keeps_code_and_message() {
        let id = CycleId::new();
        let failure = AutomationFailure::new(id, AutomationStep::Close, &CycleError::NotFound(id));
        assert_eq!(failure.cycle_id, Some(id));
        assert_eq!(failure.code, ErrorCode::CycleNotFound);
        assert!(failure.message.contains(&id.to_string()));
    }

    #[test]
    fn sweep_failure_has_no_cycle() {
        let err = DomainError::new(ErrorCode::DatabaseError, "pool timed out");
        let failure = AutomationFailure::sweep(AutomationStep::Activate, &err);
        assert_eq!(failure.cycle_id, None);
        assert_eq!(failure.code, ErrorCode::DatabaseError);
    }
}
