//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bus: BusConfig,

    #[serde(default)]
    pub skills: SkillsConfig,

    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

/// Message bus configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Slots per channel; a full channel suspends its producers.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    10
}

/// Skill execution configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsConfig {
    /// Directory holding one executable per skill.
    #[serde(default = "default_skills_dir")]
    pub dir: String,

    /// Program that runs skill scripts (e.g. `bun`). When unset the skill
    /// file is executed directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner: Option<String>,

    /// Per-invocation timeout in seconds (0 = unbounded).
    #[serde(default = "default_skill_timeout")]
    pub timeout_secs: u64,

    /// Maximum skill requests in flight at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            dir: default_skills_dir(),
            runner: None,
            timeout_secs: default_skill_timeout(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl SkillsConfig {
    /// Skills directory with a leading `~` expanded.
    ///
    /// `${VAR}` references are already expanded when the file is loaded.
    pub fn dir_path(&self) -> PathBuf {
        PathBuf::from(crate::ConfigLoader::expand_path(&self.dir))
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn default_skills_dir() -> String {
    "./skills".to_string()
}

fn default_skill_timeout() -> u64 {
    120
}

fn default_max_concurrent() -> usize {
    4
}

/// Signing vault configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_key_id")]
    pub key_id: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            key_id: default_key_id(),
        }
    }
}

fn default_key_id() -> String {
    "default-key-id".to_string()
}

/// Optional completion service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_model: Option<String>,

    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl CompletionConfig {
    pub fn provider_key(&self, provider: &str) -> Option<&str> {
        self.providers
            .get(provider)
            .and_then(|p| p.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }

    pub fn set_provider_key(&mut self, provider: impl Into<String>, key: impl Into<String>) {
        self.providers.entry(provider.into()).or_default().api_key = Some(key.into());
    }

    /// First provider that has a non-empty API key.
    pub fn first_configured_provider(&self) -> Option<&str> {
        self.providers
            .iter()
            .find(|(_, p)| p.api_key.as_deref().is_some_and(|k| !k.is_empty()))
            .map(|(name, _)| name.as_str())
    }
}

/// Provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files (default: `~/.luccibot/logs`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Shutdown configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// How long in-flight skill requests may keep running after cancellation.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_secs: default_grace_secs(),
        }
    }
}

impl ShutdownConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}

fn default_grace_secs() -> u64 {
    5
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
