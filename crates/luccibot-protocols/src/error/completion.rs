//! Completion service errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("Completion service unavailable: {0}")]
    Unavailable(String),

    #[error("Completion failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_error_display() {
        let err = CompletionError::Unavailable("no api key".to_string());
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("no api key"));

        let err = CompletionError::Failed("quota".to_string());
        assert!(err.to_string().contains("quota"));
    }
}
