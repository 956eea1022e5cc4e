//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::exit_code;
use clap::Args;
use std::fs;
use std::path::Path;

/// Commented sample configuration with every section
pub const SAMPLE_CONFIG: &str = include_str!("../../../sus-etl.example.toml");

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "sus-etl.toml")]
    pub output: String,

    /// Write only the required settings, without sink sections
    #[arg(long)]
    pub minimal: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIGURATION);
        }

        let content = if self.minimal {
            Self::generate_minimal_config()
        } else {
            SAMPLE_CONFIG
        };

        match fs::write(&self.output, content) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set SUS_API_USERNAME and SUS_API_PASSWORD (or copy .env.example to .env)");
                println!("  2. Uncomment the [storage], [postgresql] and [cosmosdb] sections you need");
                println!("  3. Validate configuration: sus-etl validate-config");
                println!("  4. Try a local run: sus-etl run --dry-run");
                println!();
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, output = %self.output, "Failed to write configuration file");
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(exit_code::FATAL)
            }
        }
    }

    fn generate_minimal_config() -> &'static str {
        r#"# SUS immunization extract configuration
# Credentials come from SUS_API_USERNAME / SUS_API_PASSWORD.

[source]
url = "https://imunizacao-es.saude.gov.br/_search"

[output]
directory = "data"
"#
    }
}
