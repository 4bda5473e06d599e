//! Export stage
//!
//! Downloads the export archive for one [`TimeWindow`](crate::domain::TimeWindow)
//! into the run's workspace, retrying transient failures with exponential
//! backoff.

pub mod exporter;

pub use exporter::Exporter;
