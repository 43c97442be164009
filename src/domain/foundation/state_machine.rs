//! State machine trait for lifecycle enums.
//!
//! Cycle status and cycle phase are both forward-only state machines. This
//! trait gives them a shared vocabulary for legality checks.

use super::ValidationError;

/// Trait for enums that represent forward-only state machines.
///
/// Implementors list their outgoing edges; everything else is derived.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for CyclePhase {
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Assessments => vec![ManagerReviews],
///             ManagerReviews => vec![Equalization],
///             Equalization => vec![],
///         }
///     }
/// }
///
/// let next = CyclePhase::Assessments.transition_to(CyclePhase::ManagerReviews)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Green,
        Amber,
        Red,
    }

    impl StateMachine for Light {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Light::Green => vec![Light::Amber],
                Light::Amber => vec![Light::Red],
                Light::Red => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_listed_edge() {
        assert_eq!(Light::Green.transition_to(Light::Amber), Ok(Light::Amber));
    }

    #[test]
    fn transition_to_rejects_skipped_state() {
        let err = Light::Green.transition_to(Light::Red).unwrap_err();
        assert!(err.to_string().contains("Cannot transition from Green to Red"));
    }

    #[test]
    fn self_transition_is_not_implied() {
        assert!(!Light::Amber.can_transition_to(&Light::Amber));
    }

    #[test]
    fn terminal_state_has_no_edges() {
        assert!(Light::Red.is_terminal());
        assert!(!Light::Green.is_terminal());
    }
}
