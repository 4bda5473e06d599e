//! Document store abstraction
//!
//! The uploader and reconciler only need two operations from the object
//! store: put one object, and list keys under a prefix. Keeping them behind a
//! trait lets tests inject faults per key.

use crate::domain::StorageError;
use async_trait::async_trait;
use bytes::Bytes;

/// Write/list interface to the object store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human-readable location, e.g. `s3://bucket`, used in logs
    fn location(&self) -> String;

    /// Store `body` under `key`, overwriting any existing object
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UploadFailed`] if the store rejects the write.
    async fn put(&self, key: &str, body: Bytes) -> Result<(), StorageError>;

    /// Full keys of every object under `prefix`
    ///
    /// Implementations follow pagination to the end; there is no page limit.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ListFailed`] if any page cannot be fetched.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Last path segment of an object key
pub fn key_basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Object key for a document: `<prefix>/<file_name>`
pub fn object_key(prefix: &str, file_name: &str) -> String {
    format!("{}/{}", prefix.trim_matches('/'), file_name)
}
