//! Signing errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("Transaction data is empty")]
    EmptyPayload,

    #[error("Signer failed: {0}")]
    Failed(String),

    #[error("Signer dropped the request")]
    Dropped,
}
