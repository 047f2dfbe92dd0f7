//! Adapters - Implementations of port interfaces.
//!
//! - `storage` - In-memory TTL stores for graphs, sessions and profiles
//! - `scheduling` - Real-time progress sweep and periodic cleanup

pub mod scheduling;
pub mod storage;

pub use scheduling::{CleanupScheduler, CleanupSchedulerConfig, ProgressSweeper, ProgressSweeperConfig};
pub use storage::{
    InMemoryProfileRepository, InMemoryProgressRepository, InMemoryRepository,
    InMemorySessionRepository,
};
