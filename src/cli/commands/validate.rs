//! Validate config command implementation
//!
//! Loads and validates the configuration file and prints a summary with
//! secrets masked.

use crate::config::{load_config, AmpsyncConfig, SecretString, StorageProvider};
use crate::core::pipeline::summary::{EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("{}", format_config_summary(&config));
        Ok(EXIT_SUCCESS)
    }
}

fn masked(secret: Option<&SecretString>) -> String {
    secret
        .map(|s| s.expose_secret().masked())
        .unwrap_or_else(|| "(not set)".to_string())
}

fn format_config_summary(config: &AmpsyncConfig) -> String {
    let mut out = String::from("Configuration Summary:\n");
    out.push_str(&format!("  Log Level: {}\n", config.application.log_level));
    out.push_str(&format!("  Dry Run: {}\n", config.application.dry_run));
    out.push_str(&format!("  Export URL: {}\n", config.amplitude.export_url));
    out.push_str(&format!(
        "  API Key: {}\n",
        config.amplitude.api_key.as_deref().unwrap_or("(not set)")
    ));
    out.push_str(&format!(
        "  Secret Key: {}\n",
        masked(config.amplitude.secret_key.as_ref())
    ));
    out.push_str(&format!(
        "  Retry: {} attempts, {} ms initial delay, x{}\n",
        config.amplitude.retry.max_attempts,
        config.amplitude.retry.initial_delay_ms,
        config.amplitude.retry.backoff_multiplier
    ));
    out.push_str(&format!("  Storage Provider: {}\n", config.storage.provider));
    match config.storage.provider {
        StorageProvider::S3 => {
            out.push_str(&format!("  Bucket: {}\n", config.storage.bucket));
            out.push_str(&format!("  Region: {}\n", config.storage.region));
            if let Some(endpoint) = &config.storage.endpoint {
                out.push_str(&format!("  Endpoint: {endpoint}\n"));
            }
            out.push_str(&format!(
                "  Access Key ID: {}\n",
                config.storage.access_key_id.as_deref().unwrap_or("(not set)")
            ));
            out.push_str(&format!(
                "  Secret Access Key: {}\n",
                masked(config.storage.secret_access_key.as_ref())
            ));
        }
        StorageProvider::Local => {
            out.push_str(&format!(
                "  Local Root: {}\n",
                config.storage.local_root.as_deref().unwrap_or("(not set)")
            ));
        }
    }
    out.push_str(&format!("  Prefix: {}\n", config.storage.normalized_prefix()));
    out.push_str(&format!(
        "  Upload Concurrency: {}\n",
        config.storage.upload_concurrency
    ));
    out.push_str(&format!(
        "  Workspace Parent: {}\n",
        config
            .workspace
            .parent_dir
            .as_deref()
            .unwrap_or("(system temp)")
    ));
    out
}
