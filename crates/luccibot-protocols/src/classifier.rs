//! Intent classification capability.

use crate::dispatch::DispatchRequest;

/// Result of classifying one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Run an external skill.
    Dispatch(DispatchRequest),
    /// Answer the user directly.
    Reply(String),
    /// The classifier has no answer; the caller picks a fallback.
    Unrecognized,
}

/// Turns raw user text into an [`Intent`].
///
/// Implementations must map every input to exactly one intent so the
/// interpreter produces exactly one reply or one dispatch per message.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Intent;
}
