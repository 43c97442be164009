//! CyclePhase enum for the sub-stages of an open cycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Sub-stage of an OPEN cycle.
///
/// Gates which kinds of assessment writes the rest of the platform accepts.
/// Phases are ordered and only ever advance one step at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CyclePhase {
    #[default]
    Assessments,
    ManagerReviews,
    Equalization,
}

impl CyclePhase {
    /// All phases in progression order.
    pub fn all() -> &'static [CyclePhase] {
        &[
            CyclePhase::Assessments,
            CyclePhase::ManagerReviews,
            CyclePhase::Equalization,
        ]
    }

    /// Returns the following phase, if any.
    pub fn next(&self) -> Option<CyclePhase> {
        match self {
            CyclePhase::Assessments => Some(CyclePhase::ManagerReviews),
            CyclePhase::ManagerReviews => Some(CyclePhase::Equalization),
            CyclePhase::Equalization => None,
        }
    }

    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Assessments => "ASSESSMENTS",
            CyclePhase::ManagerReviews => "MANAGER_REVIEWS",
            CyclePhase::Equalization => "EQUALIZATION",
        }
    }
}

impl StateMachine for CyclePhase {
    fn valid_transitions(&self) -> Vec<Self> {
        self.next().into_iter().collect()
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CyclePhase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASSESSMENTS" => Ok(CyclePhase::Assessments),
            "MANAGER_REVIEWS" => Ok(CyclePhase::ManagerReviews),
            "EQUALIZATION" => Ok(CyclePhase::Equalization),
            other => Err(ValidationError::invalid_format(
                "phase",
                format!("unknown cycle phase '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered() {
        assert!(CyclePhase::Assessments < CyclePhase::ManagerReviews);
        assert!(CyclePhase::ManagerReviews < CyclePhase::Equalization);
    }

    #[test]
    fn next_walks_the_sequence() {
        assert_eq!(CyclePhase::Assessments.next(), Some(CyclePhase::ManagerReviews));
        assert_eq!(CyclePhase::ManagerReviews.next(), Some(CyclePhase::Equalization));
        assert_eq!(CyclePhase::Equalization.next(), None);
    }

    #[test]
    fn no_skipping_and_no_reverting() {
        assert!(!CyclePhase::Assessments.can_transition_to(&CyclePhase::Equalization));
        assert!(!CyclePhase::Equalization.can_transition_to(&CyclePhase::ManagerReviews));
        assert!(!CyclePhase::ManagerReviews.can_transition_to(&CyclePhase::Assessments));
        assert!(CyclePhase::Equalization.is_terminal());
    }

    #[test]
    fn serializes_to_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&CyclePhase::ManagerReviews).unwrap(),
            "\"MANAGER_REVIEWS\""
        );
        let phase: CyclePhase = serde_json::from_str("\"EQUALIZATION\"").unwrap();
        assert_eq!(phase, CyclePhase::Equalization);
    }

    #[test]
    fn from_str_matches_display() {
        for phase in CyclePhase::all() {
            assert_eq!(phase.to_string().parse::<CyclePhase>().unwrap(), *phase);
        }
        assert!("REVIEWS".parse::<CyclePhase>().is_err());
    }
}
