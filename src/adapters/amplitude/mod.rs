//! Amplitude Export API integration
//!
//! The client issues one authenticated export request per call. Retry and
//! backoff are the exporter's job, see [`crate::core::export`].

pub mod client;

pub use client::AmplitudeClient;
