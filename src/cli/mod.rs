//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the SUS extract using clap.

pub mod commands;

use crate::config::{load_config, LoggingConfig};
use clap::{Parser, Subcommand};

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    /// Run finished with sink failures under `on_error = "continue"`
    pub const PARTIAL: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    /// Fetch or flatten failed
    pub const SOURCE: i32 = 3;
    /// A sink failed under `on_error = "fail_fast"`
    pub const SINK: i32 = 4;
    pub const FATAL: i32 = 5;
}

/// SUS immunization extract
#[derive(Parser, Debug)]
#[command(name = "sus-etl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sus-etl.toml", env = "SUS_ETL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SUS_ETL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, flatten and load into every configured sink
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Summarize a CSV file written by a previous run
    Inspect(commands::inspect::InspectArgs),
}

impl Cli {
    /// Log level and `[logging]` section to initialize logging with
    ///
    /// `run` and `validate-config` read the configuration file, so its
    /// `[logging]` section and `application.log_level` apply; `--log-level`
    /// (or `SUS_ETL_LOG_LEVEL`) takes precedence over the file. Other
    /// commands, and a file that fails to load, get console-only logging;
    /// the command itself reports the load error.
    pub fn logging_settings(&self) -> (String, LoggingConfig) {
        let config = match self.command {
            Commands::Run(_) | Commands::ValidateConfig(_) => load_config(&self.config).ok(),
            Commands::Init(_) | Commands::Inspect(_) => None,
        };

        match config {
            Some(config) => (
                self.log_level
                    .clone()
                    .unwrap_or(config.application.log_level),
                config.logging,
            ),
            None => (
                self.log_level.clone().unwrap_or_else(|| "info".to_string()),
                LoggingConfig::console_only(),
            ),
        }
    }
}
