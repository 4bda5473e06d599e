//! Core pipeline logic for ampsync.
//!
//! # Modules
//!
//! - [`workspace`] - Per-run temporary directory tree
//! - [`export`] - Archive download with retry and backoff
//! - [`unpack`] - Archive extraction and record decoding
//! - [`upload`] - Bounded-concurrency document upload
//! - [`reconcile`] - Local vs remote listing comparison
//! - [`pipeline`] - Stage orchestration and run summary
//! - [`shutdown`] - Cooperative cancellation helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use ampsync::config::load_config;
//! use ampsync::core::pipeline::{PipelineCoordinator, RunOptions};
//! use ampsync::domain::TimeWindow;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ampsync.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = PipelineCoordinator::new(config, shutdown_rx)?;
//! let window = TimeWindow::previous_day(chrono::Utc::now());
//! let summary = coordinator.run(window, RunOptions::default()).await;
//!
//! println!("Uploaded: {}", summary.uploaded());
//! std::process::exit(summary.exit_code());
//! # }
//! ```

pub mod export;
pub mod pipeline;
pub mod reconcile;
pub mod shutdown;
pub mod unpack;
pub mod upload;
pub mod workspace;

mod walk;
