//! Configuration management for ampsync.
//!
//! Configuration is a TOML file with `${VAR_NAME}` environment substitution,
//! `AMPSYNC_*` environment overrides, defaults for everything optional and
//! validation on load.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ampsync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ampsync.toml")?;
//! println!("Export endpoint: {}", config.amplitude.export_url);
//! println!("Bucket: {}/{}", config.storage.bucket, config.storage.normalized_prefix());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`AmplitudeConfig`] - export endpoint, API key pair, retry policy
//! - [`StorageConfig`] - object store backend, bucket, prefix, key pair
//! - [`WorkspaceConfig`] - where the per-run temp directory lives
//! - [`LoggingConfig`] - optional JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [amplitude]
//! api_key = "${AMP_API_KEY}"
//! secret_key = "${AMP_SECRET_KEY}"
//!
//! [storage]
//! bucket = "analytics-landing"
//! prefix = "python_import"
//! access_key_id = "${ACCESS_KEY}"
//! secret_access_key = "${SECRET_ACCESS_KEY}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    AmplitudeConfig, AmpsyncConfig, ApplicationConfig, LoggingConfig, RetryConfig, StorageConfig,
    StorageProvider, WorkspaceConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
