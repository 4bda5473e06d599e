//! Run command implementation
//!
//! Runs the full pipeline for one window: export, unpack, upload and
//! reconcile.

use crate::config::load_config;
use crate::core::pipeline::summary::{
    EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_INCOMPLETE, EXIT_INTERRUPTED, EXIT_SUCCESS,
};
use crate::core::pipeline::{PipelineCoordinator, RunOptions, RunSummary};
use crate::domain::TimeWindow;
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// First hour of the window (YYYYMMDDTHH); defaults to yesterday 00
    #[arg(long, value_name = "YYYYMMDDTHH", requires = "end")]
    pub start: Option<String>,

    /// Last hour of the window (YYYYMMDDTHH); defaults to yesterday 23
    #[arg(long, value_name = "YYYYMMDDTHH", requires = "start")]
    pub end: Option<String>,

    /// Export and unpack only; nothing is uploaded
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the reconciliation step after upload
    #[arg(long)]
    pub skip_reconcile: bool,

    /// Write the run summary as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let window = match self.window() {
            Ok(window) => window,
            Err(e) => {
                tracing::error!(error = %e, "Invalid window");
                eprintln!("Invalid window: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let options = RunOptions {
            dry_run: config.application.dry_run,
            skip_reconcile: self.skip_reconcile,
        };

        let coordinator = match PipelineCoordinator::new(config, shutdown_signal) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create pipeline coordinator");
                eprintln!("Failed to initialize pipeline: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if options.dry_run {
            println!("🔍 DRY RUN MODE - nothing will be uploaded");
            println!();
        }
        println!("🚀 Running export for {window}");
        println!();

        let summary = coordinator.run(window, options).await;

        println!("{}", summary.format_summary());

        if let Some(path) = &self.report {
            if let Err(e) = write_report(path, &summary) {
                tracing::error!(path = %path.display(), error = %e, "Failed to write run report");
                eprintln!("Failed to write report to {}: {e}", path.display());
                return Ok(EXIT_FATAL);
            }
            println!("📝 Report written to {}", path.display());
        }

        let exit_code = summary.exit_code();
        match exit_code {
            EXIT_SUCCESS => println!("✅ Run completed successfully!"),
            EXIT_INCOMPLETE => println!("⚠️  Run completed with missing or failed uploads"),
            EXIT_INTERRUPTED => println!("⚠️  Run interrupted. Re-run the same window to retry."),
            _ => println!("❌ Run failed"),
        }

        Ok(exit_code)
    }

    fn window(&self) -> crate::domain::Result<TimeWindow> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => TimeWindow::parse(start, end),
            _ => Ok(TimeWindow::previous_day(chrono::Utc::now())),
        }
    }
}

fn write_report(path: &std::path::Path, summary: &RunSummary) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}
