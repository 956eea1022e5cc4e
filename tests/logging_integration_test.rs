//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so all
//! initialization checks live in a single test.

use sus_etl::config::LoggingConfig;
use sus_etl::domain::EtlError;
use sus_etl::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default_is_console_only() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert_eq!(config.local_path, "logs");
}

#[test]
fn test_file_logging_writes_json() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("info", &config).expect("Failed to initialize logging");
    assert!(guard.has_file_layer());

    tracing::info!(target: "sus_etl", records = 3, "Run completed");
    drop(guard);

    let log_file = log_path.join(sus_etl::logging::structured::LOG_FILE_PREFIX);
    let contents = std::fs::read_to_string(&log_file).unwrap();
    let line = contents
        .lines()
        .find(|l| l.contains("Run completed"))
        .expect("log line missing");
    let json: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(json["fields"]["records"], 3);

    let second = init_logging("info", &LoggingConfig::console_only());
    assert!(matches!(second, Err(EtlError::Configuration(_))));
}
