//! Storage Adapters
//!
//! In-memory implementations of the store ports, backed by
//! `tokio::sync::RwLock<HashMap<..>>`.
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::InMemoryProgressRepository;
//!
//! let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryProgressRepository::new());
//! ```

mod in_memory_repository;

pub use in_memory_repository::{
    InMemoryProfileRepository, InMemoryProgressRepository, InMemoryRepository,
    InMemorySessionRepository,
};
