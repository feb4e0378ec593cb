//! Lifecycle supervision.
//!
//! The [`Supervisor`] owns the cancellation token shared by every component
//! and the [`TaskSpawner`] used for per-request work. Components run as named
//! tasks; the first one to exit, for whatever reason, cancels the token so
//! the others leave their loops. [`Supervisor::wait`] then collects every
//! exit, gives tracked request tasks a grace period, and reports.
//!
//! Exit policy:
//!
//! - `Ok(())` is a clean exit (cancellation or an interface-initiated quit)
//! - `Err(_)` and panics are fatal and surface as the first [`LifecycleError`]

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, Instrument};

use luccibot_protocols::LifecycleError;

use crate::spawner::TaskSpawner;

/// How a component ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    /// Returned `Ok(())`.
    Clean,
    /// Returned an error.
    Failed(String),
    /// Panicked.
    Panicked,
}

/// Exit record of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentExit {
    pub name: String,
    pub status: ExitStatus,
}

/// Summary produced by [`Supervisor::wait`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    /// Component exits in the order they happened.
    pub exits: Vec<ComponentExit>,
    /// Request tasks still running when the grace period ran out.
    pub abandoned_tasks: usize,
}

impl SupervisorReport {
    /// Name of the component whose exit started the shutdown.
    pub fn first_exit(&self) -> Option<&str> {
        self.exits.first().map(|e| e.name.as_str())
    }
}

type ComponentOutcome = (String, Result<Result<(), LifecycleError>, ()>);

/// Runs components and aggregates their termination.
pub struct Supervisor {
    cancel: CancellationToken,
    spawner: TaskSpawner,
    components: JoinSet<ComponentOutcome>,
    grace: Duration,
}

impl Supervisor {
    /// Create a supervisor that gives request tasks `grace` to finish.
    pub fn new(grace: Duration) -> Self {
        let cancel = CancellationToken::new();
        Self {
            spawner: TaskSpawner::new(cancel.clone()),
            cancel,
            components: JoinSet::new(),
            grace,
        }
    }

    /// The shared cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Spawner for per-request tasks.
    pub fn spawner(&self) -> TaskSpawner {
        self.spawner.clone()
    }

    /// Number of registered components still running.
    pub fn running(&self) -> usize {
        self.components.len()
    }

    /// Run a component under supervision.
    pub fn spawn_component<F>(&mut self, name: impl Into<String>, component: F)
    where
        F: Future<Output = Result<(), LifecycleError>> + Send + 'static,
    {
        let name = name.into();
        let span = tracing::info_span!("component", name = %name);
        debug!(component = %name, "Starting component");

        self.components.spawn(
            async move {
                let outcome = AssertUnwindSafe(component).catch_unwind().await;
                (name, outcome.map_err(|_| ()))
            }
            .instrument(span),
        );
    }

    /// Trigger cancellation.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Wait for every component to exit.
    ///
    /// Returns the first fatal error, if any component failed or panicked;
    /// otherwise a report of the shutdown.
    pub async fn wait(mut self) -> Result<SupervisorReport, LifecycleError> {
        let mut report = SupervisorReport::default();
        let mut fatal: Option<LifecycleError> = None;

        while let Some(joined) = self.components.join_next().await {
            let (name, outcome) = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Component task could not be joined: {}", e);
                    ("<unknown>".to_string(), Err(()))
                }
            };

            if !self.cancel.is_cancelled() {
                info!(component = %name, "Component exited, cancelling the rest");
                self.cancel.cancel();
            }

            let status = match outcome {
                Ok(Ok(())) => {
                    debug!(component = %name, "Component stopped");
                    ExitStatus::Clean
                }
                Ok(Err(e)) => {
                    error!(component = %name, "Component failed: {}", e);
                    let status = ExitStatus::Failed(e.to_string());
                    fatal.get_or_insert(e);
                    status
                }
                Err(()) => {
                    error!(component = %name, "Component panicked");
                    fatal.get_or_insert(LifecycleError::ComponentPanicked(name.clone()));
                    ExitStatus::Panicked
                }
            };

            report.exits.push(ComponentExit { name, status });
        }

        report.abandoned_tasks = self.spawner.shutdown(self.grace).await;
        info!(
            components = report.exits.len(),
            abandoned_tasks = report.abandoned_tasks,
            "All components stopped"
        );

        match fatal {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
