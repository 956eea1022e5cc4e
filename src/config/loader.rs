//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{EtlConfig, ErrorPolicy};
use super::secret::secret_string;
use crate::domain::errors::EtlError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`EtlConfig`]
/// 4. Applies environment variable overrides (`SUS_ETL_*` prefix, plus
///    `SUS_API_USERNAME` / `SUS_API_PASSWORD`)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`EtlError::Configuration`] if the file cannot be read, a
/// referenced variable is unset, the TOML is malformed or validation fails.
///
/// # Examples
///
/// ```no_run
/// use sus_etl::config::loader::load_config;
///
/// let config = load_config("sus-etl.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<EtlConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(EtlError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        EtlError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut config = parse_config(&contents)?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        EtlError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Parses TOML text after `${VAR}` substitution, without overrides or validation
pub fn parse_config(contents: &str) -> Result<EtlConfig> {
    let contents = substitute_env_vars(contents)?;
    toml::from_str(&contents)
        .map_err(|e| EtlError::Configuration(format!("Failed to parse TOML: {}", e)))
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
pub fn substitute_env_vars(input: &str) -> Result<String> {
    substitute_env_vars_from(input, |name| std::env::var(name).ok())
}

fn substitute_env_vars_from<F>(input: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| EtlError::Configuration(format!("Invalid substitution pattern: {}", e)))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match lookup(var_name) {
                Some(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                None => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(EtlError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides from the process environment
///
/// Variables follow the pattern `SUS_ETL_<SECTION>_<KEY>`, for example
/// `SUS_ETL_SOURCE_URL` or `SUS_ETL_POSTGRESQL_TABLE_NAME`. The API
/// credentials are read from `SUS_API_USERNAME` and `SUS_API_PASSWORD`.
pub fn apply_env_overrides(config: &mut EtlConfig) -> Result<()> {
    apply_env_overrides_from(config, |name| std::env::var(name).ok())
}

/// Applies environment variable overrides using the given lookup
pub fn apply_env_overrides_from<F>(config: &mut EtlConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    // Application
    if let Some(val) = lookup("SUS_ETL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = lookup("SUS_ETL_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_bool("SUS_ETL_APPLICATION_DRY_RUN", &val)?;
    }

    // Source
    if let Some(val) = lookup("SUS_API_USERNAME") {
        config.source.username = Some(val);
    }
    if let Some(val) = lookup("SUS_API_PASSWORD") {
        config.source.password = Some(secret_string(val));
    }
    if let Some(val) = lookup("SUS_ETL_SOURCE_URL") {
        config.source.url = val;
    }
    if let Some(val) = lookup("SUS_ETL_SOURCE_TIMEOUT_SECONDS") {
        config.source.timeout_seconds = parse_number("SUS_ETL_SOURCE_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = lookup("SUS_ETL_SOURCE_TLS_VERIFY") {
        config.source.tls_verify = parse_bool("SUS_ETL_SOURCE_TLS_VERIFY", &val)?;
    }
    if let Some(val) = lookup("SUS_ETL_SOURCE_QUERY_SIZE") {
        config.source.query.size = Some(parse_number("SUS_ETL_SOURCE_QUERY_SIZE", &val)?);
    }

    // Output
    if let Some(val) = lookup("SUS_ETL_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }
    if let Some(val) = lookup("SUS_ETL_OUTPUT_COLUMNAR_ENABLED") {
        config.output.columnar_enabled = parse_bool("SUS_ETL_OUTPUT_COLUMNAR_ENABLED", &val)?;
    }

    // Storage (only if configured)
    if let Some(ref mut storage) = config.storage {
        if let Some(val) = lookup("SUS_ETL_STORAGE_BUCKET") {
            storage.bucket = val;
        }
        if let Some(val) = lookup("SUS_ETL_STORAGE_REGION") {
            storage.region = val;
        }
        if let Some(val) = lookup("SUS_ETL_STORAGE_ENDPOINT_URL") {
            storage.endpoint_url = Some(val);
        }
        if let Some(val) = lookup("SUS_ETL_STORAGE_ACCESS_KEY_ID") {
            storage.access_key_id = Some(val);
        }
        if let Some(val) = lookup("SUS_ETL_STORAGE_SECRET_ACCESS_KEY") {
            storage.secret_access_key = Some(secret_string(val));
        }
    }

    // PostgreSQL (only if configured)
    if let Some(ref mut pg) = config.postgresql {
        if let Some(val) = lookup("SUS_ETL_POSTGRESQL_CONNECTION_STRING") {
            pg.connection_string = secret_string(val);
        }
        if let Some(val) = lookup("SUS_ETL_POSTGRESQL_TABLE_NAME") {
            pg.table_name = val;
        }
        if let Some(val) = lookup("SUS_ETL_POSTGRESQL_MAX_CONNECTIONS") {
            pg.max_connections = parse_number("SUS_ETL_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
        if let Some(val) = lookup("SUS_ETL_POSTGRESQL_SSL_MODE") {
            pg.ssl_mode = val;
        }
    }

    // Cosmos DB (only if configured)
    if let Some(ref mut cosmos) = config.cosmosdb {
        if let Some(val) = lookup("SUS_ETL_COSMOSDB_ENDPOINT") {
            cosmos.endpoint = val;
        }
        if let Some(val) = lookup("SUS_ETL_COSMOSDB_KEY") {
            cosmos.key = secret_string(val);
        }
        if let Some(val) = lookup("SUS_ETL_COSMOSDB_DATABASE_NAME") {
            cosmos.database_name = val;
        }
        if let Some(val) = lookup("SUS_ETL_COSMOSDB_CONTAINER_NAME") {
            cosmos.container_name = val;
        }
    }

    // Pipeline
    if let Some(val) = lookup("SUS_ETL_PIPELINE_ON_ERROR") {
        config.pipeline.on_error = val
            .parse::<ErrorPolicy>()
            .map_err(|e| EtlError::Configuration(format!("SUS_ETL_PIPELINE_ON_ERROR: {}", e)))?;
    }

    // Logging
    if let Some(val) = lookup("SUS_ETL_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("SUS_ETL_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = lookup("SUS_ETL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = lookup("SUS_ETL_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    value.trim().parse().map_err(|_| {
        EtlError::Configuration(format!("{} must be true or false, got '{}'", name, value))
    })
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        EtlError::Configuration(format!("{} must be a number, got '{}'", name, value))
    })
}
