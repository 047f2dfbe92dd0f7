//! In-Memory Repository Adapter
//!
//! One generic store backs every port. Entries live until deleted or swept
//! by `remove_stale`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::collaboration::CollaborationSession;
use crate::domain::context::UserProfile;
use crate::domain::foundation::{DomainError, Entity, ExpiringRepository, Repository, Timestamp};
use crate::domain::progress::ProgressGraph;

/// In-memory storage for any [`Entity`].
#[derive(Debug)]
pub struct InMemoryRepository<T: Entity> {
    entries: Arc<RwLock<HashMap<T::Id, T>>>,
}

pub type InMemoryProgressRepository = InMemoryRepository<ProgressGraph>;
pub type InMemorySessionRepository = InMemoryRepository<CollaborationSession>;
pub type InMemoryProfileRepository = InMemoryRepository<UserProfile>;

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T, T::Id> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, DomainError> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    async fn save(&self, entity: &T) -> Result<(), DomainError> {
        let mut entries = self.entries.write().await;
        entries.insert(entity.entity_id().clone(), entity.clone());
        Ok(())
    }

    async fn delete(&self, id: &T::Id) -> Result<bool, DomainError> {
        Ok(self.entries.write().await.remove(id).is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.entries.read().await.len())
    }
}

#[async_trait]
impl<T: Entity> ExpiringRepository<T, T::Id> for InMemoryRepository<T> {
    async fn find_all(&self) -> Result<Vec<T>, DomainError> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn remove_stale(&self, cutoff: Timestamp) -> Result<usize, DomainError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entity| !entity.last_activity().is_before(&cutoff));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{TaskId, UserId};
    use crate::domain::progress::MilestoneSpec;
    use crate::ports::{ProfileRepository, ProgressRepository};
    use std::time::Duration;

    fn graph(id: &str, at: Timestamp) -> ProgressGraph {
        ProgressGraph::new(
            TaskId::new(id).unwrap(),
            vec![MilestoneSpec::new("A")],
            Duration::from_secs(600),
            at,
        )
    }

    #[tokio::test]
    async fn save_and_find_round_trip() {
        let repo = InMemoryProgressRepository::new();
        let g = graph("t1", Timestamp::now());
        repo.save(&g).await.unwrap();

        let found = repo.find_by_id(g.task_id()).await.unwrap();
        assert_eq!(found.as_ref().map(|f| f.task_id()), Some(g.task_id()));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn remove_stale_only_drops_old_entries() {
        let repo = InMemoryProgressRepository::new();
        repo.save(&graph("old", Timestamp::from_unix_secs(1_000)))
            .await
            .unwrap();
        repo.save(&graph("new", Timestamp::from_unix_secs(5_000)))
            .await
            .unwrap();

        let removed = repo
            .remove_stale(Timestamp::from_unix_secs(2_000))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert!(!repo.exists(&TaskId::new("old").unwrap()).await.unwrap());
        assert!(repo.exists(&TaskId::new("new").unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let repo = InMemoryProfileRepository::new();
        let other = repo.clone();
        let profile = UserProfile::new(UserId::new("u1").unwrap(), 10, Timestamp::now());
        repo.save(&profile).await.unwrap();
        assert_eq!(other.count().await.unwrap(), 1);
        repo.clear().await;
        assert_eq!(other.count().await.unwrap(), 0);
    }

    #[test]
    fn satisfies_ports() {
        fn progress(_: &dyn ProgressRepository) {}
        fn profile(_: &dyn ProfileRepository) {}
        progress(&InMemoryProgressRepository::new());
        profile(&InMemoryProfileRepository::new());
    }
}
