//! ProgressSweeper - Background real-time progress updates.
//!
//! Every tick advances each in-progress milestone toward
//! `min(90, elapsed / estimated * 100)`. The cap keeps the sweep from ever
//! completing a milestone; only an explicit call does that.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 30s | How often to advance in-progress milestones |
//!
//! ## Races
//!
//! A sweep can interleave with a manual update of the same task. The last
//! write wins; the cap bounds what the sweep can overwrite.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::ProgressRepository;

#[derive(Debug, Clone)]
pub struct ProgressSweeperConfig {
    pub interval: Duration,
}

impl Default for ProgressSweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

impl ProgressSweeperConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

pub struct ProgressSweeper {
    repository: Arc<dyn ProgressRepository>,
    config: ProgressSweeperConfig,
}

impl ProgressSweeper {
    pub fn new(repository: Arc<dyn ProgressRepository>) -> Self {
        Self::with_config(repository, ProgressSweeperConfig::default())
    }

    pub fn with_config(repository: Arc<dyn ProgressRepository>, config: ProgressSweeperConfig) -> Self {
        Self { repository, config }
    }

    /// Run the sweep loop until shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), DomainError> {
        let mut interval = time::interval(self.config.interval);
        tracing::info!(interval_ms = self.config.interval.as_millis() as u64, "progress sweeper started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("progress sweeper stopped");
                        return Ok(());
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.sweep_once(Timestamp::now()).await {
                        tracing::warn!(error = %e, "progress sweep failed");
                    }
                }
            }
        }
    }

    /// Advances every stored graph once, returning how many milestones moved.
    pub async fn sweep_once(&self, now: Timestamp) -> Result<usize, DomainError> {
        let mut advanced = 0;
        for mut graph in self.repository.find_all().await? {
            let moved = graph.advance_realtime(now);
            if moved > 0 {
                self.repository.save(&graph).await?;
                tracing::debug!(task_id = %graph.task_id(), moved, "advanced milestones");
                advanced += moved;
            }
        }
        Ok(advanced)
    }
}
