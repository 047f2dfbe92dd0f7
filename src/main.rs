//! Agent Comms demo binary.
//!
//! Usage: `agent-comms [CONFIG_FILE] [TASK_RESULT_JSON]`
//!
//! Loads configuration, wires the in-memory stores into an orchestrator,
//! starts the background loops and prints the task response and handoff
//! for one task result.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;

use agent_comms::adapters::{
    CleanupScheduler, CleanupSchedulerConfig, InMemoryProfileRepository,
    InMemoryProgressRepository, InMemorySessionRepository, ProgressSweeper, ProgressSweeperConfig,
};
use agent_comms::application::Orchestrator;
use agent_comms::config::AppConfig;
use agent_comms::domain::context::{ContextRequest, EnvironmentInfo};
use agent_comms::domain::foundation::{TaskId, Timestamp};
use agent_comms::domain::progress::MilestoneSpec;
use agent_comms::domain::response::RenderFormat;
use agent_comms::domain::task::{TaskChange, TaskResult};
use agent_comms::ports::CleanupTarget;
use agent_comms::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => AppConfig::load_from_file(&path)?,
        None => AppConfig::load()?,
    };
    config.validate()?;
    init_tracing(&config.logging);

    let task = match args.next() {
        Some(path) => load_task(Path::new(&path))?,
        None => sample_task()?,
    };

    let progress = Arc::new(InMemoryProgressRepository::new());
    let orchestrator = Arc::new(Orchestrator::with_config(
        &config,
        progress.clone(),
        Arc::new(InMemorySessionRepository::new()),
        Arc::new(InMemoryProfileRepository::new()),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut background = Vec::new();

    if config.tracker.realtime_updates {
        let sweeper = ProgressSweeper::with_config(
            progress.clone(),
            ProgressSweeperConfig::default().with_interval(config.tracker.sweep_interval()),
        );
        let rx = shutdown_rx.clone();
        background.push(tokio::spawn(async move {
            if let Err(e) = sweeper.run(rx).await {
                tracing::error!(error = %e, "progress sweeper stopped");
            }
        }));
    }

    let target: Arc<dyn CleanupTarget> = orchestrator.clone();
    let scheduler = CleanupScheduler::new(
        target,
        CleanupSchedulerConfig::default()
            .with_interval(config.orchestrator.cleanup_interval())
            .with_max_age(config.orchestrator.max_age()),
    );
    let rx = shutdown_rx.clone();
    background.push(tokio::spawn(async move { scheduler.run(rx).await }));

    tracing::info!(task_id = %task.id, "composing responses");
    let request = ContextRequest::for_task(&task).with_environment(EnvironmentInfo {
        terminal_width: Some(100),
        ..EnvironmentInfo::default()
    });

    orchestrator
        .initialize_progress(
            task.id.clone(),
            vec![
                MilestoneSpec::new("Implement").with_estimate_minutes(20),
                MilestoneSpec::new("Verify").with_estimate_minutes(10),
            ],
            &request,
        )
        .await;

    let response = orchestrator.compose_task_response(&task, &request).await;
    println!("{}", response.render(RenderFormat::Markdown));

    let handoff = orchestrator.create_handoff(&task, &request).await;
    println!("{}", handoff.render(RenderFormat::Markdown));

    let stats = orchestrator.statistics().await;
    tracing::info!(
        operations = stats.total_operations,
        degraded = stats.degraded_responses,
        "demo finished"
    );

    let _ = shutdown_tx.send(true);
    for handle in background {
        let _ = handle.await;
    }
    Ok(())
}

fn load_task(path: &Path) -> Result<TaskResult, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn sample_task() -> Result<TaskResult, Box<dyn Error>> {
    let mut task = TaskResult::new(TaskId::new("demo-task")?, "Add request logging")?;
    task.add_output("middleware", json!("src/logging.rs"), Some("Request logger".into()));
    task.add_change(
        TaskChange::new("file", "registered the logging middleware").with_target("src/main.rs"),
    );
    task.complete(Timestamp::now(), Some(42_000));
    Ok(task)
}
