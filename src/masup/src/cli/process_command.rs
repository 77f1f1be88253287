use super::commands::{Cli, Command};
use super::handlers;
use crate::config::ConfigLoader;
use crate::logging::setup_logging;
use anyhow::{Context, Result};
use clap::Parser;

/// Process the command line.
pub fn process_command() -> Result<()> {
    // NOTE: exits the process on a parsing error
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_deref())?;
    setup_logging(&config)?;
    tracing::debug!("Loaded configuration from {:?}", config.config_sources);

    match cli.command {
        Command::Tools { json } => handlers::tools(&config, json),
        Command::Workflow => handlers::workflow(&config),
        Command::Report { file } => handlers::report(&config, &file),
        Command::Watch {
            interval_ms,
            export,
        } => tokio::runtime::Runtime::new()
            .context("Failed to start the async runtime")?
            .block_on(handlers::watch(&config, interval_ms, export)),
    }
}
