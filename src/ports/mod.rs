//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `ProgressRepository` - Milestone graphs keyed by task id
//! - `SessionRepository` - Collaboration sessions keyed by session id
//! - `ProfileRepository` - User communication profiles keyed by user id
//!
//! All three are TTL stores: entries leave only through `delete` or a
//! cleanup sweep.
//!
//! ## Scheduling Ports
//!
//! - `CleanupTarget` - Anything the cleanup scheduler can sweep

mod cleanup_target;
mod profile_repository;
mod progress_repository;
mod session_repository;

pub use cleanup_target::CleanupTarget;
pub use profile_repository::ProfileRepository;
pub use progress_repository::ProgressRepository;
pub use session_repository::SessionRepository;
