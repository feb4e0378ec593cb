//! Error types for the LucciBot protocol layer.

mod bus;
mod completion;
mod lifecycle;
mod signing;
mod skill;

pub use bus::*;
pub use completion::*;
pub use lifecycle::*;
pub use signing::*;
pub use skill::*;
