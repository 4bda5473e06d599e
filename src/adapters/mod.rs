//! External system integrations for ampsync.
//!
//! - [`amplitude`] - Amplitude Export API client
//! - [`storage`] - Object store access (S3, local filesystem, in-memory)
//!
//! Both sit behind small interfaces so the pipeline can be exercised
//! against a mock HTTP server and an in-memory store.

pub mod amplitude;
pub mod storage;
