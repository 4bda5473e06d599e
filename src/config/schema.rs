//! Configuration schema types
//!
//! This module defines the configuration structure for ampsync. Every section
//! validates itself; [`AmpsyncConfig::validate`] runs them all.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Object storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    /// Amazon S3 or an S3-compatible endpoint
    #[default]
    S3,
    /// A directory on the local filesystem (development)
    Local,
}

impl std::fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageProvider::S3 => write!(f, "s3"),
            StorageProvider::Local => write!(f, "local"),
        }
    }
}

/// Main ampsync configuration
///
/// This is the root configuration structure that maps to the TOML file. It is
/// built once at process start and passed down explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmpsyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Export API settings
    pub amplitude: AmplitudeConfig,

    /// Object storage settings
    pub storage: StorageConfig,

    /// Temporary workspace settings
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AmpsyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.amplitude.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (export and unpack only, nothing is uploaded)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Retry configuration for the export request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failed attempt, in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Delay to wait after the given failed attempt (1-based)
    ///
    /// With the defaults this is 1s after the first failure and 2s after the
    /// second, i.e. `2^n` seconds for 0-based attempt `n`.
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay_ms = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let delay_ms = delay_ms.min(self.max_delay_ms as f64) as u64;
        Duration::from_millis(delay_ms)
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(format!(
                "amplitude.retry.max_attempts must be between 1 and 10, got {}",
                self.max_attempts
            ));
        }

        if self.backoff_multiplier.is_nan() || self.backoff_multiplier <= 1.0 {
            return Err(format!(
                "amplitude.retry.backoff_multiplier must be greater than 1.0, got {}",
                self.backoff_multiplier
            ));
        }

        if self.max_delay_ms < self.initial_delay_ms {
            return Err(format!(
                "amplitude.retry.max_delay_ms ({}) must not be below initial_delay_ms ({})",
                self.max_delay_ms, self.initial_delay_ms
            ));
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Export API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmplitudeConfig {
    /// Full URL of the export endpoint
    #[serde(default = "default_export_url")]
    pub export_url: String,

    /// Project API key (basic auth user)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Project secret key (basic auth password)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub secret_key: Option<SecretString>,

    /// Request timeout in seconds; exports of a busy day can take minutes
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl AmplitudeConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.export_url.is_empty() {
            return Err("amplitude.export_url cannot be empty".to_string());
        }

        if !self.export_url.starts_with("http://") && !self.export_url.starts_with("https://") {
            return Err("amplitude.export_url must start with http:// or https://".to_string());
        }

        if self.api_key.as_ref().map(|s| s.is_empty()).unwrap_or(true) {
            return Err("amplitude.api_key cannot be empty".to_string());
        }

        if self
            .secret_key
            .as_ref()
            .map(|s| s.expose_secret().is_empty())
            .unwrap_or(true)
        {
            return Err("amplitude.secret_key cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("amplitude.timeout_seconds must be greater than 0".to_string());
        }

        self.retry.validate()?;
        Ok(())
    }
}

impl Default for AmplitudeConfig {
    fn default() -> Self {
        Self {
            export_url: default_export_url(),
            api_key: None,
            secret_key: None,
            timeout_seconds: default_timeout_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend
    #[serde(default)]
    pub provider: StorageProvider,

    /// Bucket name (s3)
    #[serde(default)]
    pub bucket: String,

    /// Key prefix all documents are written under
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// AWS region (s3)
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible stores (s3)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Access key ID (s3)
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Secret access key (s3)
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,

    /// Root directory standing in for the bucket (local)
    #[serde(default)]
    pub local_root: Option<String>,

    /// Maximum number of uploads in flight
    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,
}

impl StorageConfig {
    /// Prefix with surrounding slashes removed
    pub fn normalized_prefix(&self) -> &str {
        self.prefix.trim_matches('/')
    }

    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.normalized_prefix().is_empty() {
            return Err("storage.prefix cannot be empty".to_string());
        }

        if self.upload_concurrency == 0 || self.upload_concurrency > 64 {
            return Err(format!(
                "storage.upload_concurrency must be between 1 and 64, got {}",
                self.upload_concurrency
            ));
        }

        match self.provider {
            StorageProvider::S3 => {
                if self.bucket.is_empty() {
                    return Err("storage.bucket cannot be empty when provider is 's3'".to_string());
                }

                if self
                    .access_key_id
                    .as_ref()
                    .map(|s| s.is_empty())
                    .unwrap_or(true)
                {
                    return Err(
                        "storage.access_key_id cannot be empty when provider is 's3'".to_string()
                    );
                }

                if self
                    .secret_access_key
                    .as_ref()
                    .map(|s| s.expose_secret().is_empty())
                    .unwrap_or(true)
                {
                    return Err(
                        "storage.secret_access_key cannot be empty when provider is 's3'"
                            .to_string(),
                    );
                }

                if let Some(endpoint) = &self.endpoint {
                    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                        return Err(
                            "storage.endpoint must start with http:// or https://".to_string()
                        );
                    }
                }
            }
            StorageProvider::Local => {
                if self.local_root.as_ref().map(|s| s.is_empty()).unwrap_or(true) {
                    return Err(
                        "storage.local_root is required when provider is 'local'".to_string()
                    );
                }
            }
        }

        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            bucket: String::new(),
            prefix: default_prefix(),
            region: default_region(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            local_root: None,
            upload_concurrency: default_upload_concurrency(),
        }
    }
}

/// Temporary workspace configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory the per-run temp directory is created in (system temp if unset)
    #[serde(default)]
    pub parent_dir: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rolling files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    /// Console output only
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_export_url() -> String {
    "https://analytics.eu.amplitude.com/api/2/export".to_string()
}

fn default_timeout_seconds() -> u64 {
    600
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_prefix() -> String {
    "python_import".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_upload_concurrency() -> usize {
    8
}

fn default_local_path() -> String {
    "/var/log/ampsync".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
