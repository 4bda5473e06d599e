//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{AmpsyncConfig, StorageProvider};
use super::secret::secret_string;
use crate::domain::errors::AmpsyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Environment variable names used by earlier deployments of the job.
/// They are honoured so existing `.env` files keep working.
const LEGACY_API_KEY: &str = "AMP_API_KEY";
const LEGACY_SECRET_KEY: &str = "AMP_SECRET_KEY";
const LEGACY_ACCESS_KEY: &str = "ACCESS_KEY";
const LEGACY_SECRET_ACCESS_KEY: &str = "SECRET_ACCESS_KEY";
const LEGACY_BUCKET: &str = "AWS_BUCKET_NAME";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AmpsyncConfig
/// 4. Applies environment variable overrides (legacy names, then AMPSYNC_*)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a configuration error if the file is missing or unreadable, a
/// referenced variable is unset, the TOML is malformed, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use ampsync::config::loader::load_config;
///
/// let config = load_config("ampsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AmpsyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AmpsyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AmpsyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: AmpsyncConfig = toml::from_str(&contents)
        .map_err(|e| AmpsyncError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        AmpsyncError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    tracing::debug!(path = %path.display(), "Configuration loaded");

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied through untouched. All missing variables are
/// reported together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| AmpsyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
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
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
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
        return Err(AmpsyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides
///
/// Legacy variable names are applied first so that the namespaced
/// `AMPSYNC_<SECTION>_<KEY>` form wins when both are set.
fn apply_env_overrides(config: &mut AmpsyncConfig) {
    // Legacy names
    if let Ok(val) = std::env::var(LEGACY_API_KEY) {
        config.amplitude.api_key = Some(val);
    }
    if let Ok(val) = std::env::var(LEGACY_SECRET_KEY) {
        config.amplitude.secret_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var(LEGACY_ACCESS_KEY) {
        config.storage.access_key_id = Some(val);
    }
    if let Ok(val) = std::env::var(LEGACY_SECRET_ACCESS_KEY) {
        config.storage.secret_access_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var(LEGACY_BUCKET) {
        config.storage.bucket = val;
    }

    // Application overrides
    if let Ok(val) = std::env::var("AMPSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("AMPSYNC_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Export API overrides
    if let Ok(val) = std::env::var("AMPSYNC_AMPLITUDE_EXPORT_URL") {
        config.amplitude.export_url = val;
    }
    if let Ok(val) = std::env::var("AMPSYNC_AMPLITUDE_API_KEY") {
        config.amplitude.api_key = Some(val);
    }
    if let Ok(val) = std::env::var("AMPSYNC_AMPLITUDE_SECRET_KEY") {
        config.amplitude.secret_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("AMPSYNC_AMPLITUDE_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.amplitude.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("AMPSYNC_AMPLITUDE_RETRY_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.amplitude.retry.max_attempts = attempts;
        }
    }
    if let Ok(val) = std::env::var("AMPSYNC_AMPLITUDE_RETRY_INITIAL_DELAY_MS") {
        if let Ok(delay) = val.parse() {
            config.amplitude.retry.initial_delay_ms = delay;
        }
    }

    // Storage overrides
    if let Ok(val) = std::env::var("AMPSYNC_STORAGE_PROVIDER") {
        match val.to_lowercase().as_str() {
            "s3" => config.storage.provider = StorageProvider::S3,
            "local" => config.storage.provider = StorageProvider::Local,
            other => {
                tracing::warn!(provider = %other, "Ignoring unknown AMPSYNC_STORAGE_PROVIDER")
            }
        }
    }
    if let Ok(val) = std::env::var("AMPSYNC_STORAGE_BUCKET") {
        config.storage.bucket = val;
    }
    if let Ok(val) = std::env::var("AMPSYNC_STORAGE_PREFIX") {
        config.storage.prefix = val;
    }
    if let Ok(val) = std::env::var("AMPSYNC_STORAGE_REGION") {
        config.storage.region = val;
    }
    if let Ok(val) = std::env::var("AMPSYNC_STORAGE_ENDPOINT") {
        config.storage.endpoint = Some(val);
    }
    if let Ok(val) = std::env::var("AMPSYNC_STORAGE_ACCESS_KEY_ID") {
        config.storage.access_key_id = Some(val);
    }
    if let Ok(val) = std::env::var("AMPSYNC_STORAGE_SECRET_ACCESS_KEY") {
        config.storage.secret_access_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("AMPSYNC_STORAGE_LOCAL_ROOT") {
        config.storage.local_root = Some(val);
    }
    if let Ok(val) = std::env::var("AMPSYNC_STORAGE_UPLOAD_CONCURRENCY") {
        if let Ok(concurrency) = val.parse() {
            config.storage.upload_concurrency = concurrency;
        }
    }

    // Workspace overrides
    if let Ok(val) = std::env::var("AMPSYNC_WORKSPACE_PARENT_DIR") {
        config.workspace.parent_dir = Some(val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("AMPSYNC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("AMPSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("AMPSYNC_LOADER_TEST_VAR", "test_value");
        let input = "secret_key = \"${AMPSYNC_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result.trim_end(), "secret_key = \"test_value\"");
        std::env::remove_var("AMPSYNC_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("AMPSYNC_LOADER_COMMENTED");
        let input = "# secret_key = \"${AMPSYNC_LOADER_COMMENTED}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${AMPSYNC_LOADER_COMMENTED}"));
    }

    #[test]
    fn test_substitute_env_vars_reports_all_missing() {
        std::env::remove_var("AMPSYNC_LOADER_MISSING_A");
        std::env::remove_var("AMPSYNC_LOADER_MISSING_B");
        let input = "a = \"${AMPSYNC_LOADER_MISSING_A}\"\nb = \"${AMPSYNC_LOADER_MISSING_B}\"";
        let err = substitute_env_vars(input).unwrap_err().to_string();
        assert!(err.contains("AMPSYNC_LOADER_MISSING_A"));
        assert!(err.contains("AMPSYNC_LOADER_MISSING_B"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-ampsync.toml");
        assert!(matches!(result, Err(AmpsyncError::Configuration(_))));
    }

    #[test]
    fn test_load_config_local_provider() {
        let toml_content = r#"
[amplitude]
api_key = "api"
secret_key = "secret"

[storage]
provider = "local"
local_root = "/tmp/ampsync-store"
prefix = "events"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.storage.provider, StorageProvider::Local);
        assert_eq!(config.storage.prefix, "events");
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.amplitude.retry.max_attempts, 3);
    }
}
