//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, traits)
//! - `task` - The task result consumed from the host agent
//! - `progress` - Milestone graphs, critical path analysis and forecasting
//! - `collaboration` - Multi-round feedback sessions and keyword classification
//! - `context` - Complexity scoring, preference resolution and style rules
//! - `response` - Sections, rendering, truncation and templates
//! - `handoff` - Next actions, validation steps and handoff protocols

pub mod collaboration;
pub mod context;
pub mod foundation;
pub mod handoff;
pub mod progress;
pub mod response;
pub mod task;
