use async_trait::async_trait;
use tracing::debug;

use luccibot_protocols::{Signer, SigningError};

const MOCK_PREFIX: &[u8] = b"mock_sig_for_";

/// Stub signer identified by a key id.
///
/// Signs `data` as `mock_sig_for_<data>` and rejects empty input.
#[derive(Debug, Clone)]
pub struct LocalVault {
    key_id: String,
}

impl LocalVault {
    pub fn new(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

#[async_trait]
impl Signer for LocalVault {
    fn id(&self) -> &str {
        &self.key_id
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SigningError> {
        if payload.is_empty() {
            return Err(SigningError::EmptyPayload);
        }
        debug!(key_id = %self.key_id, bytes = payload.len(), "Signing with local vault");
        Ok([MOCK_PREFIX, payload].concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_signature() {
        let vault = LocalVault::new("default-key-id");
        let sig = vault.sign(br#"{"amount":"1"}"#).await.unwrap();
        assert_eq!(sig, br#"mock_sig_for_{"amount":"1"}"#.to_vec());
    }

    #[tokio::test]
    async fn test_empty_payload_rejected() {
        let vault = LocalVault::new("default-key-id");
        assert_eq!(vault.sign(b"").await, Err(SigningError::EmptyPayload));
    }

    #[test]
    fn test_id_is_key_id() {
        let vault = LocalVault::new("ledger-1");
        assert_eq!(vault.id(), "ledger-1");
        assert_eq!(vault.key_id(), "ledger-1");
    }
}
