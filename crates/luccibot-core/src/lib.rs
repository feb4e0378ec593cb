//! # LucciBot Core
//!
//! The pieces every component shares:
//!
//! - [`Hub`] - Four bounded, cancellation-aware channels (inbound, outbound,
//!   dispatch, signing)
//! - [`Supervisor`] - Owns the shared cancellation token, runs components and
//!   aggregates their exits
//! - [`TaskSpawner`] - Tracks per-request tasks so shutdown can account for
//!   them
//!
//! ## Architecture
//!
//! ```text
//! Interface ──inbound──▶ Interpreter ──dispatch──▶ Executor ──signing──▶ Coordinator
//!     ▲                      │                        │  ▲                   │
//!     └───────outbound───────┴────────────────────────┘  └──private reply────┘
//! ```

pub mod bus;
pub mod spawner;
pub mod supervisor;

pub use bus::{BusReceiver, Hub, HubReceivers};
pub use spawner::{SpawnerMetrics, TaskInfo, TaskSpawner};
pub use supervisor::{ComponentExit, ExitStatus, Supervisor, SupervisorReport};

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;
