//! Integration tests for logging setup
//!
//! A process can install only one global subscriber, so file logging is
//! exercised in a single test.

use ampsync::config::LoggingConfig;
use ampsync::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_is_rejected_before_install() {
    let result = init_logging("verbose", &LoggingConfig::console_only());
    assert!(result.is_err());
}

#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("info", &config).unwrap();
    tracing::info!(stage = "export", "Stage started");
    drop(guard);

    assert!(log_path.is_dir());
    assert!(log_path.join("ampsync.log").exists());
}
