//! Completion service used when a provider credential is configured.

use async_trait::async_trait;

use luccibot_protocols::{CompletionError, CompletionService};

/// Reply used when a completion provider is configured but not wired to a
/// model yet.
pub const LLM_ACKNOWLEDGEMENT: &str = "[LLM Connected] I heard you, but I am currently configured to only handle 'swap' commands.";

/// Completion service that acknowledges the configured provider without
/// calling it.
pub struct AcknowledgingCompletion {
    provider: String,
}

impl AcknowledgingCompletion {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }
}

#[async_trait]
impl CompletionService for AcknowledgingCompletion {
    fn id(&self) -> &str {
        &self.provider
    }

    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Ok(LLM_ACKNOWLEDGEMENT.to_string())
    }
}
