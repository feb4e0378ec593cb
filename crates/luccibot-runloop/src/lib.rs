//! # LucciBot RunLoop
//!
//! The long-running component loops that sit on the [`Hub`](luccibot_core::Hub):
//!
//! - [`InterpreterLoop`] - Classifies user messages into replies or dispatches
//! - [`SkillExecutor`] - Runs skills and routes their output through signing
//! - [`SigningCoordinator`] - Answers each signing request exactly once
//!
//! Each loop exits `Ok(())` once the shared cancellation token fires.

pub mod classifier;
pub mod completion;
pub mod coordinator;
pub mod executor;
pub mod interpreter;
pub mod runner;

pub use classifier::{KeywordClassifier, GREETING};
pub use completion::{AcknowledgingCompletion, LLM_ACKNOWLEDGEMENT};
pub use coordinator::SigningCoordinator;
pub use executor::{RequestOutcome, SkillExecutor};
pub use interpreter::{InterpreterLoop, NOT_UNDERSTOOD};
pub use runner::SkillRunner;
