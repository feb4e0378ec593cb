//! Message bus connecting the LucciBot components.
//!
//! The [`Hub`] owns the sending half of four bounded channels. Each channel
//! has exactly one consumer role, so the receiving halves are handed out
//! once, at construction, as [`HubReceivers`].
//!
//! Every publish and every receive races the hub's cancellation token. Once
//! the token fires, publishes fail with [`BusError::Cancelled`] without
//! touching the channel and receives return `None`, so a component blocked
//! on a full or empty channel always gets unblocked by shutdown.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use luccibot_protocols::{BusError, DispatchRequest, Event, SigningRequest};

pub const INBOUND: &str = "inbound";
pub const OUTBOUND: &str = "outbound";
pub const DISPATCH: &str = "dispatch";
pub const SIGNING: &str = "signing";

/// Shared sending side of the bus.
pub struct Hub {
    inbound: mpsc::Sender<Event>,
    outbound: mpsc::Sender<Event>,
    dispatch: mpsc::Sender<DispatchRequest>,
    signing: mpsc::Sender<SigningRequest>,
    cancel: CancellationToken,
    capacity: usize,
}

/// Receiving halves of the hub's channels, one per consumer role.
pub struct HubReceivers {
    /// Consumed by the interpreter.
    pub inbound: BusReceiver<Event>,
    /// Consumed by the interface.
    pub outbound: BusReceiver<Event>,
    /// Consumed by the skill executor.
    pub dispatch: BusReceiver<DispatchRequest>,
    /// Consumed by the signing coordinator.
    pub signing: BusReceiver<SigningRequest>,
}

impl Hub {
    /// Create a hub whose channels each hold `capacity` messages.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize, cancel: CancellationToken) -> (Arc<Self>, HubReceivers) {
        let capacity = if capacity == 0 {
            warn!("Bus capacity 0 is not allowed, using 1");
            1
        } else {
            capacity
        };

        let (inbound_tx, inbound_rx) = mpsc::channel(capacity);
        let (outbound_tx, outbound_rx) = mpsc::channel(capacity);
        let (dispatch_tx, dispatch_rx) = mpsc::channel(capacity);
        let (signing_tx, signing_rx) = mpsc::channel(capacity);

        let hub = Arc::new(Self {
            inbound: inbound_tx,
            outbound: outbound_tx,
            dispatch: dispatch_tx,
            signing: signing_tx,
            cancel: cancel.clone(),
            capacity,
        });

        let receivers = HubReceivers {
            inbound: BusReceiver::new(INBOUND, inbound_rx, cancel.clone()),
            outbound: BusReceiver::new(OUTBOUND, outbound_rx, cancel.clone()),
            dispatch: BusReceiver::new(DISPATCH, dispatch_rx, cancel.clone()),
            signing: BusReceiver::new(SIGNING, signing_rx, cancel),
        };

        (hub, receivers)
    }

    /// Per-channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Token that shuts the bus down.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Publish a user event from the interface to the interpreter.
    pub async fn publish_inbound(&self, event: Event) -> Result<(), BusError> {
        self.publish(&self.inbound, INBOUND, event).await
    }

    /// Publish an event for the interface to render.
    pub async fn publish_outbound(&self, event: Event) -> Result<(), BusError> {
        self.publish(&self.outbound, OUTBOUND, event).await
    }

    /// Publish a skill dispatch request for the executor.
    pub async fn publish_dispatch(&self, request: DispatchRequest) -> Result<(), BusError> {
        self.publish(&self.dispatch, DISPATCH, request).await
    }

    /// Publish a signing request for the coordinator.
    pub async fn publish_signing(&self, request: SigningRequest) -> Result<(), BusError> {
        self.publish(&self.signing, SIGNING, request).await
    }

    async fn publish<T>(
        &self,
        tx: &mpsc::Sender<T>,
        channel: &'static str,
        value: T,
    ) -> Result<(), BusError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(BusError::Cancelled),
            sent = tx.send(value) => {
                trace!(channel, "Published");
                sent.map_err(|_| BusError::Closed(channel))
            }
        }
    }
}

/// Cancellation-aware receiving half of one bus channel.
pub struct BusReceiver<T> {
    name: &'static str,
    rx: mpsc::Receiver<T>,
    cancel: CancellationToken,
}

impl<T> BusReceiver<T> {
    fn new(name: &'static str, rx: mpsc::Receiver<T>, cancel: CancellationToken) -> Self {
        Self { name, rx, cancel }
    }

    /// Channel name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Receive the next message.
    ///
    /// Returns `None` once cancellation fires or every sender is gone.
    pub async fn recv(&mut self) -> Option<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            msg = self.rx.recv() => msg,
        }
    }

    /// Take a message that is already queued, without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
