//! Feedback points - the questions a session asks its reviewer.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Kind of answer a feedback point expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    #[default]
    OpenQuestion,
    Approval,
    Choice,
}

/// A normalized question awaiting reviewer input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPoint {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: FeedbackKind,
    pub required: bool,
    pub options: Vec<String>,
}

impl FeedbackPoint {
    /// Yes/no confirmation asked after a suggestion.
    pub fn confirmation(id: impl Into<String>, suggestion: &str) -> Self {
        Self {
            id: id.into(),
            title: "Confirm suggested change".to_string(),
            description: format!("Should this suggestion be applied: \"{}\"?", suggestion.trim()),
            kind: FeedbackKind::Approval,
            required: true,
            options: vec!["yes".to_string(), "no".to_string()],
        }
    }

    /// Title, falling back to the description.
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.description
        } else {
            &self.title
        }
    }
}

/// Feedback point as supplied by a caller: either plain question text or a
/// structured record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedbackPointInput {
    Text(String),
    Structured {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        kind: FeedbackKind,
        #[serde(default = "default_required")]
        required: bool,
        #[serde(default)]
        options: Vec<String>,
    },
}

fn default_required() -> bool {
    true
}

impl From<&str> for FeedbackPointInput {
    fn from(text: &str) -> Self {
        FeedbackPointInput::Text(text.to_string())
    }
}

impl FeedbackPointInput {
    /// Converts the input at `index` into a [`FeedbackPoint`].
    ///
    /// Plain text becomes a required open question with id `fp{index}`. A
    /// structured point must carry a title or a description.
    pub fn normalize(self, index: usize) -> Result<FeedbackPoint, ValidationError> {
        match self {
            FeedbackPointInput::Text(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(ValidationError::empty_field(format!(
                        "feedback_points[{}]",
                        index
                    )));
                }
                Ok(FeedbackPoint {
                    id: format!("fp{}", index),
                    title: text.clone(),
                    description: text,
                    kind: FeedbackKind::OpenQuestion,
                    required: true,
                    options: Vec::new(),
                })
            }
            FeedbackPointInput::Structured {
                id,
                title,
                description,
                kind,
                required,
                options,
            } => {
                let title = title.map(|t| t.trim().to_string()).unwrap_or_default();
                let description = description
                    .map(|d| d.trim().to_string())
                    .unwrap_or_default();
                if title.is_empty() && description.is_empty() {
                    return Err(ValidationError::invalid_format(
                        format!("feedback_points[{}]", index),
                        "needs a title or a description",
                    ));
                }
                Ok(FeedbackPoint {
                    id: id
                        .filter(|i| !i.trim().is_empty())
                        .unwrap_or_else(|| format!("fp{}", index)),
                    title,
                    description,
                    kind,
                    required,
                    options,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_becomes_open_question() {
        let point = FeedbackPointInput::from("Is the API shape right?")
            .normalize(2)
            .unwrap();
        assert_eq!(point.id, "fp2");
        assert_eq!(point.kind, FeedbackKind::OpenQuestion);
        assert!(point.required);
    }

    #[test]
    fn structured_point_without_text_is_rejected() {
        let input = FeedbackPointInput::Structured {
            id: Some("x".into()),
            title: None,
            description: Some("  ".into()),
            kind: FeedbackKind::Choice,
            required: false,
            options: vec![],
        };
        assert!(matches!(
            input.normalize(0),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn structured_point_keeps_its_id() {
        let input: FeedbackPointInput = serde_json::from_str(
            r#"{"id":"db","title":"Pick a database","kind":"choice","options":["postgres","sqlite"]}"#,
        )
        .unwrap();
        let point = input.normalize(0).unwrap();
        assert_eq!(point.id, "db");
        assert_eq!(point.kind, FeedbackKind::Choice);
        assert!(point.required);
        assert_eq!(point.label(), "Pick a database");
    }

    #[test]
    fn deserializes_plain_strings() {
        let inputs: Vec<FeedbackPointInput> =
            serde_json::from_str(r#"["first?", {"description":"second"}]"#).unwrap();
        assert_eq!(inputs[0], FeedbackPointInput::Text("first?".into()));
        let second = inputs[1].clone().normalize(1).unwrap();
        assert_eq!(second.id, "fp1");
        assert_eq!(second.label(), "second");
    }

    #[test]
    fn confirmation_is_yes_no_approval() {
        let point = FeedbackPoint::confirmation("fp_r1_0", "use a cache");
        assert_eq!(point.kind, FeedbackKind::Approval);
        assert_eq!(point.options, vec!["yes", "no"]);
    }
}
