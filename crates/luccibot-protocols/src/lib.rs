//! # LucciBot Protocols
//!
//! Message types carried by the LucciBot bus and the capability traits that
//! sit at component boundaries. Contains no component implementations.
//!
//! ## Messages
//!
//! - [`Event`] - Inbound/outbound notifications between interface and core
//! - [`DispatchRequest`] - Request to run an external skill
//! - [`SigningRequest`] / [`SigningResponse`] - Correlated signing pair
//!
//! ## Capability Traits
//!
//! - [`Classifier`] - Turns free text into an [`Intent`]
//! - [`Signer`] - Produces a signature for artifact bytes
//! - [`CompletionService`] - Optional text completion backend

pub mod classifier;
pub mod completion;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod signing;

pub use classifier::{Classifier, Intent};
pub use completion::CompletionService;
pub use dispatch::DispatchRequest;
pub use error::{BusError, CompletionError, LifecycleError, SigningError, SkillError};
pub use event::{Event, EventKind, SignedArtifact};
pub use signing::{SigningReply, SigningRequest, SigningResponse, Signer};
