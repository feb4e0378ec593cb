//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a [`ConfigError`], if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(ConfigError::InvalidValue {
                field: e.path,
                message: e.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_bus(config, &mut result);
        Self::validate_skills(config, &mut result);
        Self::validate_vault(config, &mut result);
        Self::validate_completion(config, &mut result);

        result
    }

    fn validate_bus(config: &Config, result: &mut ValidationResult) {
        if config.bus.capacity == 0 {
            result.add_error(ValidationError::new(
                "bus.capacity",
                "capacity must be greater than 0",
            ));
        }
    }

    fn validate_skills(config: &Config, result: &mut ValidationResult) {
        if config.skills.dir.trim().is_empty() {
            result.add_error(ValidationError::new(
                "skills.dir",
                "Skills directory cannot be empty",
            ));
        }

        if config.skills.max_concurrent == 0 {
            result.add_error(ValidationError::new(
                "skills.max_concurrent",
                "max_concurrent must be greater than 0",
            ));
        }

        if let Some(runner) = &config.skills.runner {
            if runner.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "skills.runner",
                    "runner cannot be empty when set",
                ));
            }
        }

        if config.skills.timeout_secs == 0 {
            result.add_warning(ValidationWarning::new(
                "skills.timeout_secs",
                "Skill timeout disabled, a hung skill holds its slot until shutdown",
            ));
        }
    }

    fn validate_vault(config: &Config, result: &mut ValidationResult) {
        if config.vault.key_id.trim().is_empty() {
            result.add_error(ValidationError::new(
                "vault.key_id",
                "key_id cannot be empty",
            ));
        }
    }

    fn validate_completion(config: &Config, result: &mut ValidationResult) {
        for (name, provider) in &config.completion.providers {
            if provider.api_key.as_deref().is_none_or(str::is_empty) {
                result.add_warning(ValidationWarning::new(
                    format!("completion.providers.{}.api_key", name),
                    "API key is not set, may need to be set via environment variable",
                ));
            }
        }

        if config.completion.active_model.is_some()
            && config.completion.first_configured_provider().is_none()
        {
            result.add_warning(ValidationWarning::new(
                "completion.active_model",
                "active_model is set but no provider has an API key",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
