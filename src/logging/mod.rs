//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output with an `EnvFilter`
//! - optional JSON file output with daily or hourly rotation
//!
//! # Example
//!
//! ```no_run
//! use sus_etl::logging::init_logging;
//! use sus_etl::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(records = 42, "Run completed");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use sus_etl::log_error_with_context;
/// use sus_etl::domain::EtlError;
///
/// let error = EtlError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
