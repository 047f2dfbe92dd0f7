//! Strongly-typed identifier value objects.
//!
//! Task, milestone, session and user ids are chosen by the caller, so they
//! wrap non-empty strings. Generated ids (sessions without an explicit id,
//! next actions) use UUID v4 under a readable prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new id, returning error if empty or blank.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of the task a result, progress graph or handoff belongs to.
    TaskId,
    "task_id"
);

string_id!(
    /// Identifier of a milestone within one progress graph.
    MilestoneId,
    "milestone_id"
);

string_id!(
    /// Identifier of a collaboration session.
    SessionId,
    "session_id"
);

string_id!(
    /// Identifier of the human the agent is talking to.
    UserId,
    "user_id"
);

impl MilestoneId {
    /// Positional id assigned to milestone specs without an explicit id.
    pub fn positional(index: usize) -> Self {
        Self(format!("milestone_{}", index))
    }
}

impl SessionId {
    /// Creates a new random session id.
    pub fn generate() -> Self {
        Self(format!("collab_{}", Uuid::new_v4().simple()))
    }
}

/// Unique identifier for a planned next action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(Uuid);

impl ActionId {
    /// Creates a new random ActionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
