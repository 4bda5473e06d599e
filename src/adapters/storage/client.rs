//! `object_store`-backed document store
//!
//! Wraps any [`ObjectStore`] (S3, local filesystem, in-memory) behind the
//! [`DocumentStore`] trait.

use super::traits::DocumentStore;
use crate::config::{StorageConfig, StorageProvider};
use crate::domain::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as StoragePath;
use object_store::{ObjectStore, PutPayload};
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct ObjectStoreClient {
    store: Arc<dyn ObjectStore>,
    location: String,
}

impl ObjectStoreClient {
    /// Create a client around any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>, location: impl Into<String>) -> Self {
        Self {
            store,
            location: location.into(),
        }
    }

    /// Build the backend selected in configuration
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] if the backend cannot be built.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        match config.provider {
            StorageProvider::S3 => {
                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(&config.bucket)
                    .with_region(&config.region);

                if let Some(access_key_id) = &config.access_key_id {
                    builder = builder.with_access_key_id(access_key_id);
                }
                if let Some(secret) = &config.secret_access_key {
                    let secret: &str = secret.expose_secret().as_ref();
                    builder = builder.with_secret_access_key(secret);
                }
                if let Some(endpoint) = &config.endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }

                let store = builder
                    .build()
                    .map_err(|e| StorageError::Configuration(e.to_string()))?;

                tracing::debug!(bucket = %config.bucket, region = %config.region, "S3 store configured");
                Ok(Self::new(Arc::new(store), format!("s3://{}", config.bucket)))
            }
            StorageProvider::Local => {
                let root = config.local_root.as_deref().ok_or_else(|| {
                    StorageError::Configuration("storage.local_root is not set".to_string())
                })?;

                std::fs::create_dir_all(root).map_err(|e| {
                    StorageError::Configuration(format!("cannot create {root}: {e}"))
                })?;

                let store = LocalFileSystem::new_with_prefix(root)
                    .map_err(|e| StorageError::Configuration(e.to_string()))?;

                tracing::debug!(root = %root, "Local filesystem store configured");
                Ok(Self::new(Arc::new(store), format!("file://{root}")))
            }
        }
    }

    /// In-memory store for tests and dry runs
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()), "memory://ampsync")
    }
}

#[async_trait]
impl DocumentStore for ObjectStoreClient {
    fn location(&self) -> String {
        self.location.clone()
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<(), StorageError> {
        // `parse` keeps `#` and similar characters verbatim; `from` percent-encodes them
        let path = StoragePath::parse(key).map_err(|e| StorageError::UploadFailed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let size = body.len();

        self.store
            .put(&path, PutPayload::from(body))
            .await
            .map_err(|e| StorageError::UploadFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(key, size, "Object written");
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let prefix_path = StoragePath::parse(prefix).map_err(|e| StorageError::ListFailed {
            prefix: prefix.to_string(),
            message: e.to_string(),
        })?;

        self.store
            .list(Some(&prefix_path))
            .map_ok(|meta| meta.location.to_string())
            .try_collect()
            .await
            .map_err(|e| StorageError::ListFailed {
                prefix: prefix.to_string(),
                message: e.to_string(),
            })
    }
}
