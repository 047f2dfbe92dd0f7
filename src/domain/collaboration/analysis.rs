//! Per-round feedback analysis.

use serde::{Deserialize, Serialize};

use super::classifier::{
    action_priority, classify_intent, confidence, mentions_change, sentiment, ActionPriority,
    Intent, Sentiment,
};
use super::FeedbackPoint;

/// One classified answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedResponse {
    pub point_id: String,
    /// False when the answer key matched no feedback point.
    pub known_point: bool,
    pub text: String,
    pub intent: Intent,
    pub confidence: f64,
}

/// A change requested in feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub point_id: String,
    pub text: String,
    pub priority: ActionPriority,
}

/// Classification of every answer in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAnalysis {
    pub responses: Vec<ClassifiedResponse>,
    pub sentiment: Sentiment,
    pub action_items: Vec<ActionItem>,
    pub concerns: Vec<ClassifiedResponse>,
    pub approvals: Vec<ClassifiedResponse>,
    pub suggestions: Vec<ClassifiedResponse>,
}

impl FeedbackAnalysis {
    /// Classifies `answers` (point id, text) against the session's points.
    ///
    /// Blank answers are skipped. Answers keyed by an unknown id are still
    /// classified, as free-form comments.
    pub fn analyze(points: &[FeedbackPoint], answers: &[(String, String)]) -> Self {
        let responses: Vec<ClassifiedResponse> = answers
            .iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(point_id, text)| {
                let point = points.iter().find(|p| &p.id == point_id);
                let options = point.map(|p| p.options.as_slice()).unwrap_or(&[]);
                let intent = classify_intent(text);
                ClassifiedResponse {
                    point_id: point_id.clone(),
                    known_point: point.is_some(),
                    text: text.trim().to_string(),
                    intent,
                    confidence: confidence(text, intent, options),
                }
            })
            .collect();

        let sentiment = sentiment(responses.iter().map(|r| r.text.as_str()));

        let action_items = responses
            .iter()
            .filter(|r| mentions_change(&r.text))
            .map(|r| ActionItem {
                point_id: r.point_id.clone(),
                text: r.text.clone(),
                priority: action_priority(&r.text, r.intent),
            })
            .collect();

        let with_intent = |pred: fn(&Intent) -> bool| -> Vec<ClassifiedResponse> {
            responses.iter().filter(|r| pred(&r.intent)).cloned().collect()
        };
        let concerns = with_intent(Intent::is_concern);
        let approvals = with_intent(|i| *i == Intent::Approval);
        let suggestions = with_intent(|i| *i == Intent::Suggestion);

        Self {
            responses,
            sentiment,
            action_items,
            concerns,
            approvals,
            suggestions,
        }
    }

    pub fn answered(&self) -> usize {
        self.responses.len()
    }

    /// approvals / answered, zero when nothing was answered.
    pub fn consensus(&self) -> f64 {
        if self.responses.is_empty() {
            0.0
        } else {
            self.approvals.len() as f64 / self.responses.len() as f64
        }
    }

    pub fn high_priority_actions(&self) -> impl Iterator<Item = &ActionItem> {
        self.action_items
            .iter()
            .filter(|a| a.priority == ActionPriority::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collaboration::FeedbackPointInput;

    fn points() -> Vec<FeedbackPoint> {
        vec![
            FeedbackPointInput::from("Does the layout work?")
                .normalize(0)
                .unwrap(),
            FeedbackPointInput::from("Anything to change?")
                .normalize(1)
                .unwrap(),
        ]
    }

    fn answers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn simple_approval() {
        let analysis = FeedbackAnalysis::analyze(&points(), &answers(&[("fp0", "yes looks great")]));
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.approvals.len(), 1);
        assert!(analysis.action_items.is_empty());
        assert_eq!(analysis.consensus(), 1.0);
    }

    #[test]
    fn blank_answers_are_skipped() {
        let analysis = FeedbackAnalysis::analyze(&points(), &answers(&[("fp0", "   ")]));
        assert_eq!(analysis.answered(), 0);
        assert_eq!(analysis.consensus(), 0.0);
    }

    #[test]
    fn unknown_keys_are_free_form() {
        let analysis =
            FeedbackAnalysis::analyze(&points(), &answers(&[("general", "please add logging")]));
        assert!(!analysis.responses[0].known_point);
        assert_eq!(analysis.suggestions.len(), 1);
        assert_eq!(analysis.action_items.len(), 1);
    }

    #[test]
    fn rejections_and_uncertainty_are_concerns() {
        let analysis = FeedbackAnalysis::analyze(
            &points(),
            &answers(&[("fp0", "this is wrong"), ("fp1", "not sure yet")]),
        );
        assert_eq!(analysis.concerns.len(), 2);
        assert_eq!(analysis.approvals.len(), 0);
    }

    #[test]
    fn rejected_change_is_high_priority_action() {
        let analysis =
            FeedbackAnalysis::analyze(&points(), &answers(&[("fp1", "wrong, remove the banner")]));
        assert_eq!(analysis.high_priority_actions().count(), 1);
    }
}
