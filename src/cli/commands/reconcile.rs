//! Reconcile command implementation
//!
//! Compares a local directory of documents with the configured store
//! without running the rest of the pipeline.

use crate::adapters::storage::ObjectStoreClient;
use crate::config::load_config;
use crate::core::pipeline::summary::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_INCOMPLETE, EXIT_SUCCESS};
use crate::core::reconcile::Reconciler;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the reconcile command
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Directory of JSON documents to check
    #[arg(long, value_name = "PATH")]
    pub dir: PathBuf,

    /// Override the configured key prefix
    #[arg(long)]
    pub prefix: Option<String>,
}

impl ReconcileArgs {
    /// Execute the reconcile command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(dir = %self.dir.display(), "Starting reconcile command");

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if !self.dir.is_dir() {
            eprintln!("Not a directory: {}", self.dir.display());
            return Ok(EXIT_CONFIG_ERROR);
        }

        let store = match ObjectStoreClient::from_config(&config.storage) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "Failed to configure storage");
                eprintln!("Failed to configure storage: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let prefix = self
            .prefix
            .as_deref()
            .map(|p| p.trim_matches('/'))
            .unwrap_or_else(|| config.storage.normalized_prefix())
            .to_string();

        let report = match Reconciler::new(Arc::new(store), prefix)
            .reconcile(&self.dir)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Reconciliation failed");
                eprintln!("Reconciliation failed: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        println!("{}", report.format_summary());

        Ok(if report.is_complete() {
            EXIT_SUCCESS
        } else {
            EXIT_INCOMPLETE
        })
    }
}
