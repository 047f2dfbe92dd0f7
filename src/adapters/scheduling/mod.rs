//! Scheduling Adapters
//!
//! Background loops driven by `tokio::time::interval` and stopped through a
//! `watch` shutdown channel.
//!
//! - **ProgressSweeper** - advances in-progress milestones in real time
//! - **CleanupScheduler** - periodic TTL sweep over every store

mod cleanup_scheduler;
mod progress_sweeper;

pub use cleanup_scheduler::{CleanupScheduler, CleanupSchedulerConfig};
pub use progress_sweeper::{ProgressSweeper, ProgressSweeperConfig};
