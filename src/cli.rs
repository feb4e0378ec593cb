//! CLI definitions for LucciBot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// LucciBot CLI.
#[derive(Parser)]
#[command(name = "luccibot")]
#[command(about = "Terminal assistant that runs skills and signs their output")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.luccibot/config.toml)
    #[arg(short, long, global = true, env = "LUCCIBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skills directory, overriding the configured one
    #[arg(long, global = true)]
    pub skills_dir: Option<PathBuf>,

    /// Print events as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Also write diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Start the interactive session (default)
    Run,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Store an API key for a completion provider
    SetKey {
        /// Provider name (google, openai, ...)
        provider: String,

        /// API key
        key: String,
    },

    /// Select the active completion model
    UseModel {
        /// Model identifier
        model: String,
    },

    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::try_parse_from(["luccibot"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["luccibot", "run", "--json", "--skills-dir", "/opt/skills"])
            .unwrap();
        assert!(matches!(cli.command, Some(Commands::Run)));
        assert!(cli.json);
        assert_eq!(cli.skills_dir, Some(PathBuf::from("/opt/skills")));
    }

    #[test]
    fn test_config_set_key() {
        let cli = Cli::try_parse_from(["luccibot", "config", "set-key", "google", "abc"]).unwrap();
        match cli.command {
            Some(Commands::Config {
                action: ConfigAction::SetKey { provider, key },
            }) => {
                assert_eq!(provider, "google");
                assert_eq!(key, "abc");
            }
            _ => panic!("expected config set-key"),
        }
    }

    #[test]
    fn test_config_requires_action() {
        assert!(Cli::try_parse_from(["luccibot", "config"]).is_err());
    }
}
