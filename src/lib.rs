// ampsync - Amplitude export to object storage ETL
// Copyright (c) 2025 Ampsync Contributors
// Licensed under the MIT License

//! # ampsync - Amplitude export to object storage
//!
//! ampsync is a batch job, run once per day, that moves raw analytics events
//! from the Amplitude Export API into an object store.
//!
//! ## Overview
//!
//! Each run covers one [`TimeWindow`](domain::TimeWindow) and:
//! - **Exports** the zipped event archive, retrying transient failures
//! - **Unpacks** every gzip record in the archive's day folder to a JSON document
//! - **Uploads** the documents to S3 (or a local directory) under a fixed prefix
//! - **Reconciles** the local documents against the remote listing
//!
//! Everything happens inside a temporary workspace that is removed when the
//! run ends, whatever the outcome.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline stages and orchestration
//! - [`adapters`] - Export API client and object store access
//! - [`domain`] - Time windows, stage artifacts, errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ampsync::config::load_config;
//! use ampsync::core::pipeline::{PipelineCoordinator, RunOptions};
//! use ampsync::domain::TimeWindow;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("ampsync.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = PipelineCoordinator::new(config, shutdown_rx)?;
//!     let window = TimeWindow::parse("20240101T00", "20240101T23")?;
//!     let summary = coordinator.run(window, RunOptions::default()).await;
//!
//!     println!("Uploaded {} documents", summary.uploaded());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::AmpsyncError`] (or a per-stage error that
//! converts into it). The pipeline itself never fails outright: it returns a
//! [`RunSummary`](core::pipeline::RunSummary) recording which stage stopped
//! the run, and [`RunSummary::exit_code`](core::pipeline::RunSummary::exit_code)
//! maps that to the process exit code.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
