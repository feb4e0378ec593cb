//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            Err(e) => Err(e),
        }
    }

    /// Overlay provider keys and the active model from the process environment.
    pub fn apply_env(config: &mut Config) {
        Self::apply_env_from(config, |name| std::env::var(name).ok());
    }

    /// Overlay provider keys and the active model using `lookup` for variables.
    ///
    /// `GOOGLE_API_KEY` wins over `GEMINI_API_KEY`; both map to `google`.
    pub fn apply_env_from<F>(config: &mut Config, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(key) = non_empty("GOOGLE_API_KEY").or_else(|| non_empty("GEMINI_API_KEY")) {
            config.completion.set_provider_key("google", key);
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            config.completion.set_provider_key("openai", key);
        }
        if let Some(model) = non_empty("ACTIVE_MODEL") {
            config.completion.active_model = Some(model);
        }
    }

    /// Persist the configuration as pretty TOML, creating parent directories.
    pub fn save(config: &Config, path: &Path) -> Result<(), ConfigError> {
        Self::write(path, &toml::to_string_pretty(config)?)
    }

    /// Read the file as a TOML table, leaving `${VAR}` references untouched.
    ///
    /// Used for edits that are written back, so references never turn into
    /// their values on disk. A missing file yields an empty table.
    pub fn load_raw(path: &Path) -> Result<toml::Table, ConfigError> {
        if !path.exists() {
            return Ok(toml::Table::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(content.parse::<toml::Table>()?)
    }

    /// Check `table` against the schema and write it as pretty TOML.
    pub fn save_raw(table: &toml::Table, path: &Path) -> Result<(), ConfigError> {
        toml::Value::Table(table.clone()).try_into::<Config>()?;
        Self::write(path, &toml::to_string_pretty(table)?)
    }

    fn write(path: &Path, content: &str) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Default configuration path: `~/.luccibot/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::data_dir()?.join("config.toml"))
    }

    /// Per-user data directory: `~/.luccibot`.
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".luccibot"))
            .ok_or_else(|| ConfigError::NotFound("user home directory".to_string()))
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/skills`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}
