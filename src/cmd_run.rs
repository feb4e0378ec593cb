//! The interactive session: wires the hub, the component loops and the
//! console interface under one supervisor.

use std::sync::Arc;

use tokio::io::BufReader;
use tracing::{info, warn};

use luccibot_config::Config;
use luccibot_core::{HubReceivers, Hub, Supervisor};
use luccibot_runloop::{
    AcknowledgingCompletion, InterpreterLoop, SigningCoordinator, SkillExecutor, SkillRunner,
};
use luccibot_vault_local::LocalVault;

use crate::interface::{ConsoleInterface, OutputFormat};

/// Run a session until the user quits, input ends, Ctrl-C arrives or a
/// component fails.
pub(crate) async fn run_session(
    config: Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut supervisor = Supervisor::new(config.shutdown.grace());
    let cancel = supervisor.cancellation_token();
    let (hub, rx) = Hub::new(config.bus.capacity, cancel.clone());
    let HubReceivers {
        inbound,
        outbound,
        dispatch,
        signing,
    } = rx;

    let mut interpreter = InterpreterLoop::new(hub.clone());
    if let Some(provider) = config.completion.first_configured_provider() {
        info!(
            provider,
            model = config.completion.active_model.as_deref(),
            "Completion provider configured"
        );
        interpreter = interpreter.with_completion(Arc::new(AcknowledgingCompletion::new(provider)));
    }

    let runner = SkillRunner::from_config(&config.skills);
    if !runner.skills_dir().is_dir() {
        warn!(
            skills_dir = %runner.skills_dir().display(),
            "Skills directory does not exist, skill requests will fail"
        );
    }
    let spawner = supervisor.spawner();
    let executor = SkillExecutor::new(
        hub.clone(),
        runner,
        spawner.clone(),
        config.skills.max_concurrent,
    );

    let vault = LocalVault::new(config.vault.key_id.clone());
    let coordinator = SigningCoordinator::new(Arc::new(vault), cancel.clone());

    let interface = ConsoleInterface::new(
        hub,
        outbound,
        spawner.clone(),
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .with_format(format)
    .with_drain_limit(config.skills.timeout());

    supervisor.spawn_component("interpreter", interpreter.run(inbound));
    supervisor.spawn_component("executor", executor.run(dispatch));
    supervisor.spawn_component("coordinator", coordinator.run(signing));
    supervisor.spawn_component("interface", interface.run());

    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    info!("Interrupt received, shutting down");
                    cancel.cancel();
                }
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            },
        }
    });

    let report = supervisor.wait().await?;
    let metrics = spawner.metrics();
    info!(
        first_exit = report.first_exit(),
        abandoned_tasks = report.abandoned_tasks,
        skills_spawned = metrics.total_spawned,
        skills_completed = metrics.total_completed,
        skills_failed = metrics.total_failed,
        skills_abandoned = metrics.total_abandoned,
        "Session ended"
    );
    Ok(())
}
