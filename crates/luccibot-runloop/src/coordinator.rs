//! Signing coordinator.
//!
//! Sole consumer of the signing channel. Every request is answered exactly
//! once on its own reply channel, in arrival order.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use luccibot_core::BusReceiver;
use luccibot_protocols::{LifecycleError, Signer, SigningError, SigningRequest, SigningResponse};

pub struct SigningCoordinator {
    signer: Arc<dyn Signer>,
    cancel: CancellationToken,
}

impl SigningCoordinator {
    /// Create a coordinator whose signer calls are abandoned once `cancel`
    /// fires.
    pub fn new(signer: Arc<dyn Signer>, cancel: CancellationToken) -> Self {
        Self { signer, cancel }
    }

    /// Serve signing requests until cancellation.
    pub async fn run(self, mut requests: BusReceiver<SigningRequest>) -> Result<(), LifecycleError> {
        info!(signer = %self.signer.id(), "Signing coordinator started");

        while let Some(request) = requests.recv().await {
            self.handle(request).await;
        }

        debug!("Signing coordinator stopped");
        Ok(())
    }

    /// Sign one request and deliver the outcome to its requester.
    ///
    /// A request interrupted by cancellation is still answered, with an error.
    pub async fn handle(&self, request: SigningRequest) {
        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(SigningError::Failed("signing cancelled by shutdown".to_string()))
            }
            response = self.sign(request.payload()) => response,
        };

        if let Err(e) = &response {
            warn!("Signing request rejected: {}", e);
        }
        if !request.respond(response) {
            debug!("Requester gone before the signature was delivered");
        }
    }

    /// Sign a payload. Empty payloads are rejected without reaching the signer.
    pub async fn sign(&self, payload: &[u8]) -> SigningResponse {
        if payload.is_empty() {
            return Err(SigningError::EmptyPayload);
        }
        self.signer.sign(payload).await
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
