//! CleanupTarget port for the periodic TTL sweep.

use async_trait::async_trait;
use std::time::Duration;

/// Something that can purge entries older than a maximum age.
#[async_trait]
pub trait CleanupTarget: Send + Sync {
    /// Purges entries idle for longer than `max_age`, returning how many
    /// were removed.
    async fn cleanup(&self, max_age: Duration) -> usize;
}
