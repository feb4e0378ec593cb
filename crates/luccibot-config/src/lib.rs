//! # LucciBot Config
//!
//! Configuration management for LucciBot: TOML schema, loading with
//! environment substitution and overlay, validation and saving.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
