//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX` so they do not
//! interfere with each other.

use ampsync::config::{load_config, StorageProvider};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

const MANAGED_VARS: &[&str] = &[
    "AMP_API_KEY",
    "AMP_SECRET_KEY",
    "ACCESS_KEY",
    "SECRET_ACCESS_KEY",
    "AWS_BUCKET_NAME",
    "AMPSYNC_APPLICATION_LOG_LEVEL",
    "AMPSYNC_APPLICATION_DRY_RUN",
    "AMPSYNC_AMPLITUDE_API_KEY",
    "AMPSYNC_STORAGE_BUCKET",
    "AMPSYNC_STORAGE_PREFIX",
    "AMPSYNC_STORAGE_PROVIDER",
    "AMPSYNC_STORAGE_UPLOAD_CONCURRENCY",
    "TEST_AMPSYNC_SECRET",
];

/// Lock the environment and clear every variable these tests touch
fn clean_env() -> MutexGuard<'static, ()> {
    let guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    for var in MANAGED_VARS {
        std::env::remove_var(var);
    }
    guard
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const S3_CONFIG: &str = r#"
[application]
log_level = "debug"

[amplitude]
export_url = "https://analytics.eu.amplitude.com/api/2/export"
api_key = "file-api-key"
secret_key = "file-secret-key"

[amplitude.retry]
max_attempts = 5
initial_delay_ms = 500

[storage]
provider = "s3"
bucket = "file-bucket"
prefix = "python_import"
access_key_id = "AKIAFILE"
secret_access_key = "file-aws-secret"
upload_concurrency = 16
"#;

#[test]
fn test_load_complete_config() {
    let _env = clean_env();
    let file = write_config(S3_CONFIG);

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.amplitude.api_key.as_deref(), Some("file-api-key"));
    assert_eq!(config.amplitude.retry.max_attempts, 5);
    assert_eq!(config.amplitude.retry.initial_delay_ms, 500);
    assert_eq!(config.storage.provider, StorageProvider::S3);
    assert_eq!(config.storage.bucket, "file-bucket");
    assert_eq!(config.storage.upload_concurrency, 16);
}

#[test]
fn test_legacy_environment_names_override_file() {
    let _env = clean_env();
    std::env::set_var("AMP_API_KEY", "legacy-api");
    std::env::set_var("AMP_SECRET_KEY", "legacy-secret");
    std::env::set_var("ACCESS_KEY", "AKIALEGACY");
    std::env::set_var("SECRET_ACCESS_KEY", "legacy-aws-secret");
    std::env::set_var("AWS_BUCKET_NAME", "legacy-bucket");
    let file = write_config(S3_CONFIG);

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.amplitude.api_key.as_deref(), Some("legacy-api"));
    let secret: &str = config
        .amplitude
        .secret_key
        .as_ref()
        .unwrap()
        .expose_secret()
        .as_ref();
    assert_eq!(secret, "legacy-secret");
    assert_eq!(config.storage.access_key_id.as_deref(), Some("AKIALEGACY"));
    assert_eq!(config.storage.bucket, "legacy-bucket");

    for var in MANAGED_VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_namespaced_overrides_win_over_legacy_names() {
    let _env = clean_env();
    std::env::set_var("AWS_BUCKET_NAME", "legacy-bucket");
    std::env::set_var("AMPSYNC_STORAGE_BUCKET", "namespaced-bucket");
    std::env::set_var("AMPSYNC_STORAGE_PREFIX", "landing");
    std::env::set_var("AMPSYNC_APPLICATION_DRY_RUN", "true");
    let file = write_config(S3_CONFIG);

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.storage.bucket, "namespaced-bucket");
    assert_eq!(config.storage.prefix, "landing");
    assert!(config.application.dry_run);

    for var in MANAGED_VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_placeholder_substitution() {
    let _env = clean_env();
    std::env::set_var("TEST_AMPSYNC_SECRET", "from-environment");
    let file = write_config(
        r#"
[amplitude]
api_key = "api"
secret_key = "${TEST_AMPSYNC_SECRET}"

[storage]
provider = "local"
local_root = "/tmp/ampsync-config-test"
"#,
    );

    let config = load_config(file.path()).unwrap();
    let secret: &str = config
        .amplitude
        .secret_key
        .as_ref()
        .unwrap()
        .expose_secret()
        .as_ref();
    assert_eq!(secret, "from-environment");

    std::env::remove_var("TEST_AMPSYNC_SECRET");
}

#[test]
fn test_missing_placeholder_is_reported() {
    let _env = clean_env();
    let file = write_config(
        r#"
[amplitude]
api_key = "api"
secret_key = "${TEST_AMPSYNC_SECRET}"

[storage]
provider = "local"
local_root = "/tmp/ampsync-config-test"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_AMPSYNC_SECRET"));
}

#[test]
fn test_s3_requires_bucket() {
    let _env = clean_env();
    let file = write_config(
        r#"
[amplitude]
api_key = "api"
secret_key = "secret"

[storage]
provider = "s3"
access_key_id = "AKIA"
secret_access_key = "secret"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("bucket"));
}

#[test]
fn test_missing_credentials_fail_validation() {
    let _env = clean_env();
    let file = write_config(
        r#"
[amplitude]

[storage]
provider = "local"
local_root = "/tmp/ampsync-config-test"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("api_key"));
}

#[test]
fn test_invalid_upload_concurrency_override_is_rejected() {
    let _env = clean_env();
    std::env::set_var("AMPSYNC_STORAGE_UPLOAD_CONCURRENCY", "0");
    let file = write_config(S3_CONFIG);

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("upload_concurrency"));

    std::env::remove_var("AMPSYNC_STORAGE_UPLOAD_CONCURRENCY");
}
