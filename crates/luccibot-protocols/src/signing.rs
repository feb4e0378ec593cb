//! Signing request/response pair and the signer capability.
//!
//! Every [`SigningRequest`] owns a private, single-use reply channel. The
//! requester keeps the matching [`SigningReply`]; the coordinator answers by
//! consuming the request, so a request can be answered at most once and the
//! reply can never land on another requester's channel.

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::SigningError;

/// Outcome of a signing request: signature bytes or the reason for failure.
pub type SigningResponse = Result<Vec<u8>, SigningError>;

/// Receiving half of a request's private reply channel.
pub type SigningReply = oneshot::Receiver<SigningResponse>;

/// A request to sign an artifact.
pub struct SigningRequest {
    payload: Vec<u8>,
    reply: oneshot::Sender<SigningResponse>,
}

impl SigningRequest {
    /// Create a request together with its capacity-one reply channel.
    pub fn new(payload: Vec<u8>) -> (Self, SigningReply) {
        let (reply, rx) = oneshot::channel();
        (Self { payload, reply }, rx)
    }

    /// Artifact bytes to sign.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether the requester has stopped waiting for the answer.
    pub fn is_abandoned(&self) -> bool {
        self.reply.is_closed()
    }

    /// Deliver the single response for this request.
    ///
    /// Returns `false` if the requester dropped its [`SigningReply`].
    pub fn respond(self, response: SigningResponse) -> bool {
        self.reply.send(response).is_ok()
    }
}

impl std::fmt::Debug for SigningRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningRequest")
            .field("payload_len", &self.payload.len())
            .field("abandoned", &self.is_abandoned())
            .finish()
    }
}

/// Signing capability.
///
/// Given artifact bytes, return a signature or a descriptive error. No
/// batching and no streaming.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Identifier of the key or backend, used in logs.
    fn id(&self) -> &str;

    /// Sign the given payload.
    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SigningError>;
}
