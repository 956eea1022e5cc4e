//! Configuration management for the SUS extract.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! The configuration file supports:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SUS_ETL_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Optional sink sections: a sink without a section is skipped
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sus_etl::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sus-etl.toml")?;
//!
//! println!("Source: {}", config.source.url);
//! if let Some(pg) = &config.postgresql {
//!     println!("Table: {}", pg.table_name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`SourceConfig`] - search API endpoint, Basic auth credentials, timeout
//! - [`OutputConfig`] - local file directory and names
//! - [`StorageConfig`] - S3-compatible bucket
//! - [`PostgreSQLConfig`] - relational table
//! - [`CosmosDbConfig`] - document container
//! - [`PipelineConfig`] - sink failure policy
//! - [`LoggingConfig`] - JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! url = "https://imunizacao-es.saude.gov.br/_search"
//! username = "${SUS_API_USERNAME}"
//! password = "${SUS_API_PASSWORD}"
//!
//! [storage]
//! bucket = "stack-sus"
//! endpoint_url = "https://storage.googleapis.com"
//! force_path_style = true
//!
//! [postgresql]
//! connection_string = "${SUS_ETL_DATABASE_URL}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CosmosDbConfig, Environment, ErrorPolicy, EtlConfig, LoggingConfig,
    OutputConfig, PipelineConfig, PostgreSQLConfig, QueryConfig, SourceConfig, StorageConfig,
    DEFAULT_SOURCE_URL, MAX_STATEMENT_TIMEOUT_SECONDS,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
