//! Message bus errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("Bus operation cancelled")]
    Cancelled,

    #[error("Channel closed: {0}")]
    Closed(&'static str),
}

impl BusError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BusError::Cancelled)
    }
}
