//! Init command implementation
//!
//! Writes a sample configuration file.

use crate::core::pipeline::summary::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "ampsync.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing ampsync configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let config_content = if self.with_examples {
            generate_config_with_examples()
        } else {
            generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - AMP_API_KEY and AMP_SECRET_KEY for the export API");
                println!("     - ACCESS_KEY, SECRET_ACCESS_KEY and AWS_BUCKET_NAME for S3");
                println!("  3. Validate configuration: ampsync validate-config");
                println!("  4. Try a dry run: ampsync run --dry-run");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

fn generate_minimal_config() -> String {
    r#"# ampsync configuration
# Credentials are read from the environment (AMP_API_KEY, AMP_SECRET_KEY,
# ACCESS_KEY, SECRET_ACCESS_KEY, AWS_BUCKET_NAME) or AMPSYNC_* overrides.

[application]
log_level = "info"

[amplitude]
export_url = "https://analytics.eu.amplitude.com/api/2/export"

[storage]
provider = "s3"
prefix = "python_import"
region = "us-east-1"
"#
    .to_string()
}

fn generate_config_with_examples() -> String {
    r#"# ampsync configuration
#
# Values may reference environment variables with ${VAR_NAME}; every
# referenced variable must be set. Any key can also be overridden with
# AMPSYNC_<SECTION>_<KEY>, e.g. AMPSYNC_STORAGE_PREFIX.

[application]
# trace, debug, info, warn, error
log_level = "info"
# Export and unpack only; skip upload and reconciliation
dry_run = false

[amplitude]
export_url = "https://analytics.eu.amplitude.com/api/2/export"
api_key = "${AMP_API_KEY}"
secret_key = "${AMP_SECRET_KEY}"
# A full day can take several minutes to export
timeout_seconds = 600

[amplitude.retry]
# Total attempts including the first
max_attempts = 3
# Wait after the first failure; doubled after each further failure
initial_delay_ms = 1000
backoff_multiplier = 2.0
max_delay_ms = 30000

[storage]
# "s3" or "local"
provider = "s3"
bucket = "${AWS_BUCKET_NAME}"
prefix = "python_import"
region = "us-east-1"
# endpoint = "http://localhost:9000"
access_key_id = "${ACCESS_KEY}"
secret_access_key = "${SECRET_ACCESS_KEY}"
# Directory used instead of a bucket when provider = "local"
# local_root = "/var/lib/ampsync/store"
upload_concurrency = 8

[workspace]
# Parent for the per-run temporary directory (default: system temp)
# parent_dir = "/var/tmp/ampsync"

[logging]
local_enabled = false
local_path = "/var/log/ampsync"
# daily, hourly, never
local_rotation = "daily"
"#
    .to_string()
}
