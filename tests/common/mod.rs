//! Shared fixtures for integration tests

#![allow(dead_code)]

use ampsync::adapters::storage::DocumentStore;
use ampsync::config::{
    secret_string, AmplitudeConfig, AmpsyncConfig, RetryConfig, StorageConfig, WorkspaceConfig,
};
use ampsync::domain::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Basic auth header for `user:pass`
pub const AUTH_HEADER: &str = "Basic dXNlcjpwYXNz";

pub const EXPORT_PATH: &str = "/api/2/export";

/// A zip archive with each `(path, json)` entry gzipped as `<path>.gz`
pub fn export_archive(records: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (path, json) in records {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        let gz = encoder.finish().unwrap();

        writer
            .start_file(format!("{path}.gz"), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(&gz).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Configuration pointing at a mock export server, with millisecond backoff
pub fn test_config(server_url: &str, workspace_parent: &Path) -> AmpsyncConfig {
    AmpsyncConfig {
        application: Default::default(),
        amplitude: AmplitudeConfig {
            export_url: format!("{server_url}{EXPORT_PATH}"),
            api_key: Some("user".to_string()),
            secret_key: Some(secret_string("pass".to_string())),
            timeout_seconds: 10,
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 1,
                max_delay_ms: 10,
                backoff_multiplier: 2.0,
            },
        },
        storage: StorageConfig {
            upload_concurrency: 4,
            ..Default::default()
        },
        workspace: WorkspaceConfig {
            parent_dir: Some(workspace_parent.to_string_lossy().to_string()),
        },
        logging: Default::default(),
    }
}

/// True when the workspace parent holds no leftover run directories
pub fn workspace_cleaned(parent: &Path) -> bool {
    std::fs::read_dir(parent).unwrap().next().is_none()
}

/// Store that rejects writes whose key ends with one of `fail_suffixes`
pub struct FaultyStore {
    fail_suffixes: Vec<String>,
    written: Mutex<Vec<String>>,
}

impl FaultyStore {
    pub fn new(fail_suffixes: &[&str]) -> Self {
        Self {
            fail_suffixes: fail_suffixes.iter().map(|s| s.to_string()).collect(),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn written(&self) -> Vec<String> {
        let mut keys = self.written.lock().unwrap().clone();
        keys.sort();
        keys
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    fn location(&self) -> String {
        "faulty://test".to_string()
    }

    async fn put(&self, key: &str, _body: Bytes) -> Result<(), StorageError> {
        if self.fail_suffixes.iter().any(|s| key.ends_with(s.as_str())) {
            return Err(StorageError::UploadFailed {
                key: key.to_string(),
                message: "injected fault".to_string(),
            });
        }
        self.written.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .written
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
