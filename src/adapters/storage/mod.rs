//! Object storage integration
//!
//! - [`traits`] - the [`DocumentStore`] interface used by the pipeline
//! - [`client`] - [`ObjectStoreClient`], backed by the `object_store` crate

pub mod client;
pub mod traits;

pub use client::ObjectStoreClient;
pub use traits::{key_basename, object_key, DocumentStore};
