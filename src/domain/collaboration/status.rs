//! Collaboration session status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Where a session stands in its feedback negotiation.
///
/// Completed is terminal; the only way back is creating a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationStatus {
    #[default]
    Created,
    AwaitingFeedback,
    ReadyToProceed,
    Completed,
}

impl CollaborationStatus {
    /// True while feedback can still be processed.
    pub fn accepts_feedback(&self) -> bool {
        !matches!(self, CollaborationStatus::Completed)
    }
}

impl StateMachine for CollaborationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CollaborationStatus::*;
        matches!(
            (self, target),
            (Created, AwaitingFeedback)
                | (Created, Completed)
                | (AwaitingFeedback, AwaitingFeedback)
                | (AwaitingFeedback, ReadyToProceed)
                | (AwaitingFeedback, Completed)
                | (ReadyToProceed, AwaitingFeedback)
                | (ReadyToProceed, ReadyToProceed)
                | (ReadyToProceed, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CollaborationStatus::*;
        match self {
            Created => vec![AwaitingFeedback, Completed],
            AwaitingFeedback => vec![AwaitingFeedback, ReadyToProceed, Completed],
            ReadyToProceed => vec![AwaitingFeedback, ReadyToProceed, Completed],
            Completed => vec![],
        }
    }
}

impl fmt::Display for CollaborationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CollaborationStatus::Created => "created",
            CollaborationStatus::AwaitingFeedback => "awaiting_feedback",
            CollaborationStatus::ReadyToProceed => "ready_to_proceed",
            CollaborationStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_is_terminal() {
        assert!(CollaborationStatus::Completed.is_terminal());
        for target in [
            CollaborationStatus::Created,
            CollaborationStatus::AwaitingFeedback,
            CollaborationStatus::ReadyToProceed,
        ] {
            assert!(!CollaborationStatus::Completed.can_transition_to(&target));
        }
    }

    #[test]
    fn feedback_loop_is_allowed() {
        let s = CollaborationStatus::AwaitingFeedback;
        assert_eq!(
            s.transition_to(CollaborationStatus::AwaitingFeedback),
            Ok(CollaborationStatus::AwaitingFeedback)
        );
    }

    #[test]
    fn created_cannot_jump_to_ready() {
        assert!(CollaborationStatus::Created
            .transition_to(CollaborationStatus::ReadyToProceed)
            .is_err());
    }

    #[test]
    fn transitions_agree_with_valid_list() {
        use CollaborationStatus::*;
        for from in [Created, AwaitingFeedback, ReadyToProceed, Completed] {
            for to in from.valid_transitions() {
                assert!(from.can_transition_to(&to), "{from:?} -> {to:?}");
            }
        }
    }
}
