//! Local vault for LucciBot.
//!
//! [`LocalVault`] stands in for a real key store during development: it
//! never touches key material and returns a recognizable mock signature.

mod vault;

pub use vault::LocalVault;
