//! CleanupScheduler - Periodic TTL sweep.
//!
//! The sweep is the only eviction path for the in-process stores. It runs
//! concurrently with reads but is not atomic with an update to an entry
//! that has just gone stale; such an update may be lost.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::ports::CleanupTarget;

#[derive(Debug, Clone)]
pub struct CleanupSchedulerConfig {
    /// How often to sweep.
    pub interval: Duration,

    /// Entries idle for longer than this are purged.
    pub max_age: Duration,
}

impl Default for CleanupSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3_600),
            max_age: Duration::from_secs(24 * 3_600),
        }
    }
}

impl CleanupSchedulerConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }
}

pub struct CleanupScheduler {
    target: Arc<dyn CleanupTarget>,
    config: CleanupSchedulerConfig,
}

impl CleanupScheduler {
    pub fn new(target: Arc<dyn CleanupTarget>, config: CleanupSchedulerConfig) -> Self {
        Self { target, config }
    }

    /// Run the cleanup loop until shutdown signal is received.
    ///
    /// The first tick fires immediately, so a sweep runs at startup.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("cleanup scheduler stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    self.run_once().await;
                }
            }
        }
    }

    /// Runs one sweep and returns the purge count.
    pub async fn run_once(&self) -> usize {
        let purged = self.target.cleanup(self.config.max_age).await;
        if purged > 0 {
            tracing::info!(purged, "cleanup sweep removed stale entries");
        }
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTarget {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CleanupTarget for CountingTarget {
        async fn cleanup(&self, max_age: Duration) -> usize {
            assert_eq!(max_age, Duration::from_secs(60));
            self.calls.fetch_add(1, Ordering::SeqCst);
            3
        }
    }

    fn config() -> CleanupSchedulerConfig {
        CleanupSchedulerConfig::default()
            .with_interval(Duration::from_millis(10))
            .with_max_age(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn run_once_returns_purge_count() {
        let target = Arc::new(CountingTarget {
            calls: AtomicUsize::new(0),
        });
        let scheduler = CleanupScheduler::new(target.clone(), config());
        assert_eq!(scheduler.run_once().await, 3);
        assert_eq!(target.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loop_sweeps_until_shutdown() {
        let target = Arc::new(CountingTarget {
            calls: AtomicUsize::new(0),
        });
        let scheduler = CleanupScheduler::new(target.clone(), config());
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { scheduler.run(rx).await });

        time::sleep(Duration::from_millis(35)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(target.calls.load(Ordering::SeqCst) >= 1);
    }
}
