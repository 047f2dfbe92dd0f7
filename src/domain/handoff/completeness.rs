//! Completeness scoring for handoff instructions and protocols.

use serde::{Deserialize, Serialize};

use super::{HandoffInstructions, HandoffProtocol};

pub const BUCKET_POINTS: u8 = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// 0 to 100 in steps of 25.
    pub score: u8,
    pub complete: bool,
    pub missing: Vec<String>,
}

/// Scores four buckets: next actions, validations when outputs exist,
/// continuation options and recommendations. Without next actions the
/// handoff is incomplete whatever the score.
pub fn validate_instructions(instructions: &HandoffInstructions) -> CompletenessReport {
    let mut score = 0u8;
    let mut missing = Vec::new();

    let has_actions = !instructions.next_actions.is_empty();
    if has_actions {
        score += BUCKET_POINTS;
    } else {
        missing.push("next_actions".to_string());
    }

    if !instructions.task.has_outputs() || !instructions.validation_steps.is_empty() {
        score += BUCKET_POINTS;
    } else {
        missing.push("validation_steps".to_string());
    }

    if instructions.continuation_options.is_empty() {
        missing.push("continuation_options".to_string());
    } else {
        score += BUCKET_POINTS;
    }

    if instructions.recommendations.is_empty() {
        missing.push("recommendations".to_string());
    } else {
        score += BUCKET_POINTS;
    }

    CompletenessReport {
        score,
        complete: has_actions,
        missing,
    }
}

/// Instruction scoring plus the protocol's context requirement.
pub fn validate_protocol(protocol: &HandoffProtocol) -> CompletenessReport {
    let mut report = validate_instructions(&protocol.instructions);
    if protocol.context.is_none() {
        report.complete = false;
        report.missing.push("context".to_string());
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{CommunicationContext, Urgency};
    use crate::domain::foundation::{TaskId, Timestamp};
    use crate::domain::task::TaskResult;
    use serde_json::json;

    fn instructions() -> HandoffInstructions {
        let mut t = TaskResult::new(TaskId::new("t1").unwrap(), "Task").unwrap();
        t.add_output("report", json!("ok"), None);
        t.complete(Timestamp::now(), None);
        HandoffInstructions::create(&t, None, Urgency::Normal, Timestamp::now())
    }

    #[test]
    fn full_instructions_score_100() {
        let report = validate_instructions(&instructions());
        assert_eq!(report.score, 100);
        assert!(report.complete);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn missing_next_actions_is_incomplete() {
        let mut i = instructions();
        i.next_actions.clear();
        let report = validate_instructions(&i);
        assert_eq!(report.score, 75);
        assert!(!report.complete);
        assert_eq!(report.missing, vec!["next_actions"]);
    }

    #[test]
    fn outputs_without_validation_lose_a_bucket() {
        let mut i = instructions();
        i.validation_steps.clear();
        let report = validate_instructions(&i);
        assert_eq!(report.score, 75);
        assert!(report.complete);
    }

    #[test]
    fn protocol_without_context_is_incomplete() {
        let p = HandoffProtocol::new(instructions(), None, Timestamp::now());
        let report = validate_protocol(&p);
        assert_eq!(report.score, 100);
        assert!(!report.complete);
        assert_eq!(report.missing, vec!["context"]);

        let ctx = CommunicationContext::fallback(Timestamp::now());
        let p = HandoffProtocol::new(instructions(), Some(&ctx), Timestamp::now());
        assert!(validate_protocol(&p).complete);
    }
}
