//! Config subcommand handlers for LucciBot.

use std::path::Path;

use luccibot_config::{Config, ConfigError, ConfigLoader};

use crate::cli::ConfigAction;

/// Handle config subcommands.
pub(crate) fn handle_config_command(
    action: ConfigAction,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let mut config = ConfigLoader::load_or_default(path)?;
            ConfigLoader::apply_env(&mut config);
            print!("{}", show(&config)?);
        }
        ConfigAction::SetKey { provider, key } => {
            set_key(path, &provider, &key)?;
            println!("Saved API key for {} to {}", provider, path.display());
        }
        ConfigAction::UseModel { model } => {
            use_model(path, &model)?;
            println!("Active model set to {}", model);
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}

/// Effective configuration as TOML, with API keys masked.
fn show(config: &Config) -> Result<String, Box<dyn std::error::Error>> {
    let mut masked = config.clone();
    for provider in masked.completion.providers.values_mut() {
        if let Some(key) = provider.api_key.as_mut() {
            *key = mask_key(key);
        }
    }
    Ok(toml::to_string_pretty(&masked)?)
}

// Edits go through the raw table: `${VAR}` references and unset variables
// stay as written, and environment overlays are not persisted.
fn set_key(path: &Path, provider: &str, key: &str) -> Result<(), ConfigError> {
    let mut table = ConfigLoader::load_raw(path)?;
    let providers = section(section(&mut table, "completion")?, "providers")?;
    section(providers, provider)?.insert("api_key".to_string(), toml::Value::from(key));
    ConfigLoader::save_raw(&table, path)
}

fn use_model(path: &Path, model: &str) -> Result<(), ConfigError> {
    let mut table = ConfigLoader::load_raw(path)?;
    section(&mut table, "completion")?
        .insert("active_model".to_string(), toml::Value::from(model));
    ConfigLoader::save_raw(&table, path)
}

/// Sub-table `key` of `table`, created when missing.
fn section<'a>(table: &'a mut toml::Table, key: &str) -> Result<&'a mut toml::Table, ConfigError> {
    table
        .entry(key)
        .or_insert_with(|| toml::Value::Table(toml::Table::new()))
        .as_table_mut()
        .ok_or_else(|| ConfigError::InvalidValue {
            field: key.to_string(),
            message: "expected a table".to_string(),
        })
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}****", visible)
}
