//! Handoff module - what the next person (or agent) should do with a result.
//!
//! Next actions and validation steps are built from options structs with
//! named defaults. Instructions bundle them with continuation options and
//! recommendations; a protocol adds the context the handoff was made in.

mod action;
mod completeness;
mod continuation;
mod instructions;
mod validation;

pub use action::{
    generate_next_actions, sort_actions, suggests_deployment, ActionCategory, NextAction,
    NextActionOptions, Priority,
};
pub use completeness::{validate_instructions, validate_protocol, CompletenessReport, BUCKET_POINTS};
pub use continuation::{continuation_options, ContinuationOption};
pub use instructions::{
    recommendations, ContextSnapshot, HandoffInstructions, HandoffProtocol, HandoffRecommendation,
    TaskSnapshot, SLOW_TASK_MS,
};
pub use validation::{
    needs_health_check, validation_steps, ValidationStep, ValidationStepOptions,
};
