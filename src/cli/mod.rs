//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// ampsync - Amplitude export to object storage ETL
#[derive(Parser, Debug)]
#[command(name = "ampsync")]
#[command(version, about, long_about = None)]
#[command(author = "Ampsync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "ampsync.toml", env = "AMPSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "AMPSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export one window, unpack it, upload the documents and reconcile
    Run(commands::run::RunArgs),

    /// Compare a local document directory with the configured store
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
