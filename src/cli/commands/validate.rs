//! Validate config command implementation
//!
//! This module implements the `validate-config` command. Loading includes
//! `${VAR}` substitution, environment overrides and validation.

use crate::adapters::factory;
use crate::adapters::postgresql::redact_connection_string;
use crate::cli::exit_code;
use crate::config::{load_config, EtlConfig};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also connect to every configured sink
    #[arg(long)]
    pub check_connections: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                print_summary(&config);
                if self.check_connections && !check_connections(&config).await {
                    return Ok(exit_code::SINK);
                }
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(exit_code::CONFIGURATION)
            }
        }
    }
}

/// Returns false if any configured sink is unreachable
async fn check_connections(config: &EtlConfig) -> bool {
    let bucket = match factory::create_object_store(config).await {
        Ok(Some(store)) => Some(store.test_connection().await),
        Ok(None) => None,
        Err(e) => Some(Err(e)),
    };
    let relational = match factory::create_relational_store(config).await {
        Ok(Some(store)) => Some(store.test_connection().await),
        Ok(None) => None,
        Err(e) => Some(Err(e)),
    };
    let documents = match factory::create_document_store(config).await {
        Ok(Some(store)) => Some(store.test_connection().await),
        Ok(None) => None,
        Err(e) => Some(Err(e)),
    };

    println!("Connection Checks:");
    let mut all_ok = true;
    for (name, outcome) in [
        ("Bucket", bucket),
        ("PostgreSQL", relational),
        ("Cosmos DB", documents),
    ] {
        match outcome {
            None => println!("  ⏭️  {name}: not configured"),
            Some(Ok(())) => println!("  ✅ {name}: reachable"),
            Some(Err(e)) => {
                tracing::warn!(sink = name, error = %e, "Connection check failed");
                println!("  ❌ {name}: {e}");
                all_ok = false;
            }
        }
    }
    println!();
    all_ok
}

fn print_summary(config: &EtlConfig) {
    println!("Configuration Summary:");
    println!("  Environment: {:?}", config.environment);
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    println!("  Source: {}", config.source.url);
    if let Some(size) = config.source.query.size {
        println!("  Query Size: {size}");
    }
    println!("  Output Directory: {}", config.output.directory);
    println!("  Parquet: {}", config.output.columnar_enabled);
    println!("  On Error: {}", config.pipeline.on_error);

    match config.storage {
        Some(ref storage) => println!("  Bucket: {} ({})", storage.bucket, storage.region),
        None => println!("  Bucket: not configured"),
    }
    match config.postgresql {
        Some(ref pg) => println!(
            "  PostgreSQL: {} (table {})",
            redact_connection_string(pg.connection_string.expose_secret().as_ref()),
            pg.table_name
        ),
        None => println!("  PostgreSQL: not configured"),
    }
    match config.cosmosdb {
        Some(ref cosmos) => println!(
            "  Cosmos DB: {}/{}",
            cosmos.database_name, cosmos.container_name
        ),
        None => println!("  Cosmos DB: not configured"),
    }
    println!();
}
