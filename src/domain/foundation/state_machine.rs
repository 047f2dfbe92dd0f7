//! State machine trait for status enums.
//!
//! Milestone and collaboration statuses implement this trait so that every
//! status change goes through one validated path.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors define valid state transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for MilestoneStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!(
///             (self, target),
///             (Pending, InProgress) | (Pending, Completed) | (InProgress, Completed)
///         )
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Pending => vec![InProgress, Completed],
///             InProgress => vec![Completed],
///             Completed => vec![],
///         }
///     }
/// }
///
/// let next = milestone.status.transition_to(MilestoneStatus::Completed)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

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
    enum ReviewStatus {
        Open,
        Reviewing,
        Approved,
        Closed,
    }

    impl StateMachine for ReviewStatus {
        fn can_transition_to(&self, target: &Self) -> bool {
            use ReviewStatus::*;
            matches!(
                (self, target),
                (Open, Reviewing) | (Reviewing, Reviewing) | (Reviewing, Approved) | (Approved, Closed)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use ReviewStatus::*;
            match self {
                Open => vec![Reviewing],
                Reviewing => vec![Reviewing, Approved],
                Approved => vec![Closed],
                Closed => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        let result = ReviewStatus::Open.transition_to(ReviewStatus::Reviewing);
        assert_eq!(result, Ok(ReviewStatus::Reviewing));
    }

    #[test]
    fn transition_to_allows_declared_self_loop() {
        let result = ReviewStatus::Reviewing.transition_to(ReviewStatus::Reviewing);
        assert_eq!(result, Ok(ReviewStatus::Reviewing));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        let result = ReviewStatus::Open.transition_to(ReviewStatus::Closed);
        assert!(result.is_err());
    }

    #[test]
    fn is_terminal_only_for_states_without_exits() {
        assert!(ReviewStatus::Closed.is_terminal());
        assert!(!ReviewStatus::Open.is_terminal());
        assert!(!ReviewStatus::Approved.is_terminal());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for status in [
            ReviewStatus::Open,
            ReviewStatus::Reviewing,
            ReviewStatus::Approved,
            ReviewStatus::Closed,
        ] {
            for valid_target in status.valid_transitions() {
                assert!(
                    status.can_transition_to(&valid_target),
                    "can_transition_to should return true for {:?} -> {:?}",
                    status,
                    valid_target
                );
            }
        }
    }
}
