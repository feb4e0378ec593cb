//! Interpreter loop.
//!
//! Turns each inbound user message into exactly one reply or one skill
//! dispatch.

use std::sync::Arc;

use tracing::{debug, info, warn};

use luccibot_core::{BusReceiver, Hub};
use luccibot_protocols::{
    BusError, Classifier, CompletionService, Event, Intent, LifecycleError,
};

use crate::classifier::KeywordClassifier;
use crate::completion::LLM_ACKNOWLEDGEMENT;

/// Reply for input nothing could make sense of.
pub const NOT_UNDERSTOOD: &str = "I didn't understand that. Try 'swap 1 eth'.";

const STARTED: &str = "Agent started. Waiting for input...";

pub struct InterpreterLoop {
    hub: Arc<Hub>,
    classifier: Arc<dyn Classifier>,
    completion: Option<Arc<dyn CompletionService>>,
}

impl InterpreterLoop {
    /// Interpreter with the keyword classifier and no completion service.
    pub fn new(hub: Arc<Hub>) -> Self {
        Self {
            hub,
            classifier: Arc::new(KeywordClassifier::new()),
            completion: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Ask `completion` for a reply when the classifier has none.
    pub fn with_completion(mut self, completion: Arc<dyn CompletionService>) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Process inbound events until cancellation or until the channel closes.
    pub async fn run(self, mut inbound: BusReceiver<Event>) -> Result<(), LifecycleError> {
        info!(
            completion = self.completion.as_ref().map(|c| c.id()),
            "Interpreter started"
        );

        if let Err(e) = self.hub.publish_outbound(Event::log(STARTED)).await {
            return Self::stopped(e);
        }

        while let Some(event) = inbound.recv().await {
            let text = match event {
                Event::UserMessage(text) => text,
                other => {
                    debug!(kind = %other.kind(), "Ignoring non-user event");
                    continue;
                }
            };
            if let Err(e) = self.process(&text).await {
                return Self::stopped(e);
            }
        }

        debug!("Interpreter stopped");
        Ok(())
    }

    /// Handle one user message.
    ///
    /// Blank input produces nothing. Anything else publishes a
    /// `Processing` log followed by exactly one response or dispatch.
    pub async fn process(&self, text: &str) -> Result<(), BusError> {
        if text.trim().is_empty() {
            return Ok(());
        }

        self.hub
            .publish_outbound(Event::log(format!("Processing: {}", text)))
            .await?;

        match self.classifier.classify(text) {
            Intent::Dispatch(request) => {
                self.hub
                    .publish_outbound(Event::log(format!("Identified intent: {}", request)))
                    .await?;
                self.hub.publish_dispatch(request).await
            }
            Intent::Reply(reply) => self.hub.publish_outbound(Event::response(reply)).await,
            Intent::Unrecognized => {
                let reply = self.fallback(text).await;
                self.hub.publish_outbound(Event::response(reply)).await
            }
        }
    }

    async fn fallback(&self, text: &str) -> String {
        let Some(completion) = &self.completion else {
            return NOT_UNDERSTOOD.to_string();
        };

        match completion.complete(text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(provider = %completion.id(), "Completion failed: {}", e);
                LLM_ACKNOWLEDGEMENT.to_string()
            }
        }
    }

    fn stopped(e: BusError) -> Result<(), LifecycleError> {
        if !e.is_cancelled() {
            warn!("Interpreter stopping: {}", e);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod tests;
