//! LucciBot - terminal assistant that runs skills and signs their output.
//!
//! Main entry point for the LucciBot CLI.

mod cli;
mod cmd_config;
mod cmd_run;
mod interface;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};

use luccibot_config::{ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};
use crate::cmd_config::handle_config_command;
use crate::cmd_run::run_session;
use crate::interface::OutputFormat;
use crate::logging::init_tracing;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("luccibot: {}", e);
            1
        }
    };

    // A blocked stdin read would otherwise keep the runtime alive.
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match cli.config {
        Some(path) => path,
        None => ConfigLoader::default_path()?,
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Config { action } => handle_config_command(action, &config_path),
        Commands::Run => {
            let mut config = ConfigLoader::load_or_default(&config_path)?;
            ConfigLoader::apply_env(&mut config);
            if let Some(dir) = cli.skills_dir {
                config.skills.dir = dir.to_string_lossy().into_owned();
            }

            let log_dir = match &config.logging.dir {
                Some(dir) => PathBuf::from(ConfigLoader::expand_path(dir)),
                None => ConfigLoader::data_dir()?.join("logs"),
            };
            let _guard = init_tracing(&config.logging.level, &log_dir, cli.verbose)?;

            let warnings = ConfigValidator::validate(&config).into_result()?;
            for warning in warnings {
                warn!(path = %warning.path, "{}", warning.message);
            }

            info!(config = %config_path.display(), "Starting LucciBot");
            let format = if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            };

            let result = run_session(config, format).await;
            if let Err(e) = &result {
                error!("Session failed: {}", e);
            }
            result
        }
    }
}
