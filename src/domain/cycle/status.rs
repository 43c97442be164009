//! CycleStatus enum for tracking the lifecycle of evaluation cycles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of an evaluation cycle.
///
/// Status only moves forward: `Upcoming -> Open -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStatus {
    #[default]
    Upcoming,
    Open,
    Closed,
}

impl CycleStatus {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Upcoming => "UPCOMING",
            CycleStatus::Open => "OPEN",
            CycleStatus::Closed => "CLOSED",
        }
    }

    /// Returns true if this is the active status.
    pub fn is_open(&self) -> bool {
        matches!(self, CycleStatus::Open)
    }
}

impl StateMachine for CycleStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            CycleStatus::Upcoming => vec![CycleStatus::Open],
            CycleStatus::Open => vec![CycleStatus::Closed],
            CycleStatus::Closed => vec![],
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CycleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPCOMING" => Ok(CycleStatus::Upcoming),
            "OPEN" => Ok(CycleStatus::Open),
            "CLOSED" => Ok(CycleStatus::Closed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown cycle status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_upcoming() {
        assert_eq!(CycleStatus::default(), CycleStatus::Upcoming);
    }

    #[test]
    fn only_forward_edges_exist() {
        assert!(CycleStatus::Upcoming.can_transition_to(&CycleStatus::Open));
        assert!(CycleStatus::Open.can_transition_to(&CycleStatus::Closed));

        assert!(!CycleStatus::Upcoming.can_transition_to(&CycleStatus::Closed));
        assert!(!CycleStatus::Open.can_transition_to(&CycleStatus::Upcoming));
        assert!(!CycleStatus::Closed.can_transition_to(&CycleStatus::Open));
        assert!(!CycleStatus::Closed.can_transition_to(&CycleStatus::Upcoming));
    }

    #[test]
    fn closed_is_terminal() {
        assert!(CycleStatus::Closed.is_terminal());
        assert!(!CycleStatus::Upcoming.is_terminal());
        assert!(!CycleStatus::Open.is_terminal());
    }

    #[test]
    fn serializes_to_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&CycleStatus::Open).unwrap(), "\"OPEN\"");
        let status: CycleStatus = serde_json::from_str("\"UPCOMING\"").unwrap();
        assert_eq!(status, CycleStatus::Upcoming);
    }

    #[test]
    fn from_str_matches_display() {
        for status in [CycleStatus::Upcoming, CycleStatus::Open, CycleStatus::Closed] {
            assert_eq!(status.to_string().parse::<CycleStatus>().unwrap(), status);
        }
        assert!("open".parse::<CycleStatus>().is_err());
    }
}
