use crate::constants::WORKING_DIR;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

fn footer_message() -> String {
    format!(
        "Default working directory: {}\nConfiguration is read from --config, then MASUP_* environment variables.\n",
        WORKING_DIR
    )
}

#[derive(Parser, Clone, Debug)]
#[clap(
    name = "masup",
    about = "Malware analysis supporter: tracks which analysis tools run and how far the methodology got",
    version,
    after_help = footer_message()
)]
pub struct Cli {
    /// TOML configuration file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Poll the process table and record tool activity until interrupted
    Watch {
        /// Polling interval in milliseconds, overrides the configuration
        #[clap(long)]
        interval_ms: Option<u64>,
        /// Export the analysis to this file on exit
        #[clap(long)]
        export: Option<PathBuf>,
    },

    /// List the tools of the loaded catalog
    Tools {
        /// Output the catalog in JSON format
        #[clap(long)]
        json: bool,
    },

    /// Show the workflow steps, their tools and what follows them
    Workflow,

    /// Summarise an exported analysis
    Report {
        /// Analysis file written by `watch --export`
        file: PathBuf,
    },
}
