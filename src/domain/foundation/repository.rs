//! Base repository traits for the in-process stores.
//!
//! Every store in this crate is keyed by a caller-chosen id and lives for
//! the process lifetime. Entries leave a store in exactly two ways: an
//! explicit `delete`, or a cleanup sweep through
//! [`ExpiringRepository::remove_stale`]. There is no implicit eviction.
//!
//! # Example
//!
//! ```ignore
//! // Domain-specific port extends the base traits
//! pub trait ProgressRepository: ExpiringRepository<ProgressGraph, TaskId> {}
//!
//! // Services only know about the port
//! pub struct ProgressTracker {
//!     repository: Arc<dyn ProgressRepository>,
//! }
//! ```

use async_trait::async_trait;
use std::fmt::Debug;
use std::hash::Hash;

use super::{DomainError, Timestamp};

/// An aggregate that can be stored and expired.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identifier type used as the store key.
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Returns the aggregate's id.
    fn entity_id(&self) -> &Self::Id;

    /// Last time the aggregate was mutated; cleanup sweeps compare this
    /// against their cutoff.
    fn last_activity(&self) -> Timestamp;
}

/// Base trait for aggregate repositories.
///
/// `save` is an upsert: re-initialising a progress graph or re-creating a
/// session with an existing id replaces the stored aggregate.
#[async_trait]
pub trait Repository<T, ID>: Send + Sync
where
    T: Send + Sync,
    ID: Send + Sync + Debug + 'static,
{
    /// Finds an aggregate by its unique identifier.
    ///
    /// Returns `Ok(None)` if the aggregate doesn't exist.
    async fn find_by_id(&self, id: &ID) -> Result<Option<T>, DomainError>;

    /// Inserts or replaces an aggregate.
    async fn save(&self, entity: &T) -> Result<(), DomainError>;

    /// Deletes an aggregate, returning whether it existed.
    async fn delete(&self, id: &ID) -> Result<bool, DomainError>;

    /// Number of stored aggregates.
    async fn count(&self) -> Result<usize, DomainError>;

    /// Checks if an aggregate with the given ID exists.
    async fn exists(&self, id: &ID) -> Result<bool, DomainError> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

/// Repositories swept by the TTL cleanup.
#[async_trait]
pub trait ExpiringRepository<T, ID>: Repository<T, ID>
where
    T: Send + Sync,
    ID: Send + Sync + Debug + 'static,
{
    /// Snapshot of every stored aggregate, in no particular order.
    async fn find_all(&self) -> Result<Vec<T>, DomainError>;

    /// Removes every aggregate whose last activity is before `cutoff`.
    ///
    /// Returns the number of removed aggregates.
    async fn remove_stale(&self, cutoff: Timestamp) -> Result<usize, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: u32,
        touched: Timestamp,
    }

    impl Entity for Note {
        type Id = u32;

        fn entity_id(&self) -> &u32 {
            &self.id
        }

        fn last_activity(&self) -> Timestamp {
            self.touched
        }
    }

    struct NoteRepo {
        data: Mutex<HashMap<u32, Note>>,
    }

    impl NoteRepo {
        fn new() -> Self {
            Self {
                data: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl Repository<Note, u32> for NoteRepo {
        async fn find_by_id(&self, id: &u32) -> Result<Option<Note>, DomainError> {
            Ok(self.data.lock().unwrap().get(id).cloned())
        }

        async fn save(&self, entity: &Note) -> Result<(), DomainError> {
            self.data
                .lock()
                .unwrap()
                .insert(*entity.entity_id(), entity.clone());
            Ok(())
        }

        async fn delete(&self, id: &u32) -> Result<bool, DomainError> {
            Ok(self.data.lock().unwrap().remove(id).is_some())
        }

        async fn count(&self) -> Result<usize, DomainError> {
            Ok(self.data.lock().unwrap().len())
        }
    }

    #[tokio::test]
    async fn exists_default_uses_find_by_id() {
        let repo = NoteRepo::new();
        let note = Note {
            id: 1,
            touched: Timestamp::now(),
        };
        repo.save(&note).await.unwrap();

        assert!(repo.exists(&1).await.unwrap());
        assert!(!repo.exists(&2).await.unwrap());
    }

    #[tokio::test]
    async fn save_replaces_existing_entity() {
        let repo = NoteRepo::new();
        let first = Note {
            id: 1,
            touched: Timestamp::from_unix_secs(10),
        };
        let second = Note {
            id: 1,
            touched: Timestamp::from_unix_secs(20),
        };
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.find_by_id(&1).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn delete_reports_whether_entity_existed() {
        let repo = NoteRepo::new();
        repo.save(&Note {
            id: 7,
            touched: Timestamp::now(),
        })
        .await
        .unwrap();

        assert!(repo.delete(&7).await.unwrap());
        assert!(!repo.delete(&7).await.unwrap());
    }

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn Repository<Note, u32>) {}
}
