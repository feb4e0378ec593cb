//! Skill executor.
//!
//! Consumes dispatch requests, runs the skill, sends its output through the
//! signing coordinator and reports the outcome on the outbound channel. Each
//! request runs in its own tracked task, bounded by a semaphore, so one slow
//! skill never blocks the dispatch channel.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use luccibot_core::{BusReceiver, Hub, TaskSpawner};
use luccibot_protocols::{
    DispatchRequest, Event, LifecycleError, SignedArtifact, SigningError, SigningRequest,
    SkillError,
};

use crate::runner::SkillRunner;

/// How a single dispatch request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Skill output was signed and published.
    Signed,
    /// The skill could not be run or exited unsuccessfully.
    SkillFailed,
    /// The signer rejected the artifact or dropped the request.
    SigningFailed,
    /// Shutdown interrupted the request.
    Cancelled,
}

pub struct SkillExecutor {
    hub: Arc<Hub>,
    runner: Arc<SkillRunner>,
    spawner: TaskSpawner,
    permits: Arc<Semaphore>,
}

impl SkillExecutor {
    /// Create an executor running at most `max_concurrent` skills at once.
    pub fn new(
        hub: Arc<Hub>,
        runner: SkillRunner,
        spawner: TaskSpawner,
        max_concurrent: usize,
    ) -> Self {
        Self {
            hub,
            runner: Arc::new(runner),
            spawner,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Receive dispatch requests until cancellation.
    pub async fn run(self, mut requests: BusReceiver<DispatchRequest>) -> Result<(), LifecycleError> {
        let cancel = self.hub.cancellation_token().clone();
        info!(
            skills_dir = %self.runner.skills_dir().display(),
            max_concurrent = self.permits.available_permits(),
            "Skill executor started"
        );

        while let Some(request) = requests.recv().await {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = self.permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let hub = self.hub.clone();
            let runner = self.runner.clone();
            self.spawner
                .spawn(format!("skill:{}", request.skill_name), async move {
                    let _permit = permit;
                    let outcome = Self::handle_request(&hub, &runner, request).await;
                    debug!(?outcome, "Request finished");
                });
        }

        debug!("Skill executor stopped");
        Ok(())
    }

    /// Run one request to completion and publish its outcome.
    pub async fn handle_request(
        hub: &Hub,
        runner: &SkillRunner,
        request: DispatchRequest,
    ) -> RequestOutcome {
        let cancel = hub.cancellation_token();
        let name = request.skill_name.clone();

        let artifact = match runner.run(&request, cancel).await {
            Ok(artifact) => artifact,
            Err(SkillError::Cancelled) => return RequestOutcome::Cancelled,
            Err(e) => {
                warn!(skill = %name, "Skill failed: {}", e);
                let event = Event::error(format!("Failed to execute skill {}: {}", name, e));
                return match hub.publish_outbound(event).await {
                    Ok(()) => RequestOutcome::SkillFailed,
                    Err(_) => RequestOutcome::Cancelled,
                };
            }
        };

        let (signing, reply) = SigningRequest::new(artifact.clone());
        if hub.publish_signing(signing).await.is_err() {
            return RequestOutcome::Cancelled;
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return RequestOutcome::Cancelled,
            response = reply => response.unwrap_or(Err(SigningError::Dropped)),
        };

        let signature = match response {
            Ok(signature) => signature,
            Err(e) => {
                warn!(skill = %name, "Signing failed: {}", e);
                return match hub.publish_outbound(Event::error(format!("Signing failed: {}", e))).await {
                    Ok(()) => RequestOutcome::SigningFailed,
                    Err(_) => RequestOutcome::Cancelled,
                };
            }
        };

        let signed = SignedArtifact::new(name, artifact, signature);
        let log = Event::log(format!(
            "Transaction signed successfully. Signature: {}",
            signed.signature_text()
        ));
        if hub.publish_outbound(log).await.is_err()
            || hub.publish_outbound(Event::Signed(signed)).await.is_err()
        {
            return RequestOutcome::Cancelled;
        }
        RequestOutcome::Signed
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
