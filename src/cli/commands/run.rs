//! Run command implementation
//!
//! This module implements the `run` command: one fetch, one flatten, then
//! every configured sink.

use crate::cli::exit_code;
use crate::config::{load_config, ErrorPolicy};
use crate::core::pipeline::{Pipeline, RunSummary, StageStatus};
use crate::domain::{EtlError, Result};
use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Fetch, flatten and write local files only
    #[arg(long)]
    pub dry_run: bool,

    /// Record sink failures and keep going instead of stopping
    #[arg(long)]
    pub continue_on_error: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        if self.continue_on_error {
            tracing::info!("Enabling continue-on-error from CLI");
            config.pipeline.on_error = ErrorPolicy::Continue;
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - only local files will be written");
            println!();
        }

        let pipeline = match Pipeline::from_config(&config).await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize pipeline");
                eprintln!("Failed to initialize run: {e}");
                return Ok(match e {
                    EtlError::Configuration(_) => exit_code::CONFIGURATION,
                    _ => exit_code::FATAL,
                });
            }
        };

        println!("🚀 Starting run...");
        println!();

        let outcome = pipeline.run().await;
        if let Ok(ref summary) = outcome {
            print_summary(summary);
        }

        Ok(exit_code_for(&outcome))
    }
}

/// Map a run outcome to the process exit code
pub fn exit_code_for(outcome: &Result<RunSummary>) -> i32 {
    match outcome {
        Ok(summary) if summary.is_successful() => {
            println!("✅ Run completed successfully!");
            exit_code::SUCCESS
        }
        Ok(_) => {
            println!("⚠️  Run completed with sink failures");
            exit_code::PARTIAL
        }
        Err(e) => {
            eprintln!("Run failed: {e}");
            match e.stage() {
                Some(stage) if stage.is_sink() => exit_code::SINK,
                Some(_) => exit_code::SOURCE,
                None => match e {
                    EtlError::Configuration(_) => exit_code::CONFIGURATION,
                    _ => exit_code::FATAL,
                },
            }
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!("📊 Run Summary:");
    println!("  Run ID: {}", summary.run_id);
    println!("  Records: {}", summary.record_count);
    if let Some(duration) = summary.duration() {
        println!("  Duration: {:.2}s", duration.as_secs_f64());
    }
    for report in &summary.stages {
        let marker = match report.status {
            StageStatus::Succeeded => "✅",
            StageStatus::Skipped => "⏭️ ",
            StageStatus::Failed => "❌",
        };
        println!(
            "  {marker} {:<10} {:<9} {}",
            report.stage.as_str(),
            report.status.to_string(),
            report.detail
        );
    }
    println!();
}
