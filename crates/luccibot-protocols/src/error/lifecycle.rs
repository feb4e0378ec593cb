//! Component lifecycle errors.

use thiserror::Error;

use super::BusError;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Component {component} failed: {message}")]
    ComponentFailed { component: String, message: String },

    #[error("Component {0} panicked")]
    ComponentPanicked(String),

    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    #[error("Startup failed: {0}")]
    Startup(String),
}

impl LifecycleError {
    pub fn component_failed(component: impl Into<String>, message: impl Into<String>) -> Self {
        LifecycleError::ComponentFailed {
            component: component.into(),
            message: message.into(),
        }
    }
}
