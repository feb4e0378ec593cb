//! Optional text completion capability.

use async_trait::async_trait;

use crate::error::CompletionError;

/// External text completion backend: text in, text out, fallible.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Provider identifier, used in logs.
    fn id(&self) -> &str;

    /// Produce a reply for the given user text.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
