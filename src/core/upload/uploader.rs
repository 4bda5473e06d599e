//! Bounded-concurrency document uploader

use super::report::{UploadFailure, UploadReport};
use crate::adapters::storage::{object_key, DocumentStore};
use crate::core::shutdown::shutdown_requested;
use crate::core::walk;
use crate::domain::{AmpsyncError, Result, StorageError};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Suffix of documents picked up for upload
pub const DOCUMENT_SUFFIX: &str = ".json";

enum Outcome {
    Uploaded(String),
    Failed(UploadFailure),
    Skipped(String),
}

/// Uploads a directory of documents to a [`DocumentStore`]
pub struct Uploader {
    store: Arc<dyn DocumentStore>,
    prefix: String,
    concurrency: usize,
    shutdown: watch::Receiver<bool>,
}

impl Uploader {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        prefix: impl Into<String>,
        concurrency: usize,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            concurrency: concurrency.max(1),
            shutdown,
        }
    }

    /// Upload every `.json` file under `document_dir`, recursively
    ///
    /// Keys are flat: `<prefix>/<file name>`. Two files with the same name in
    /// different subdirectories map to the same key and the later write wins;
    /// this is logged as a warning.
    ///
    /// Once shutdown is requested, documents not yet started are recorded as
    /// skipped. Uploads already in flight are allowed to finish.
    ///
    /// # Errors
    ///
    /// Only fails if `document_dir` cannot be listed. Per-document failures
    /// are recorded in the report.
    pub async fn upload(&self, document_dir: &Path) -> Result<UploadReport> {
        let started = Instant::now();
        let dir = document_dir.to_path_buf();
        let files = tokio::task::spawn_blocking(move || walk::files_with_suffix(&dir, DOCUMENT_SUFFIX))
            .await
            .map_err(|e| AmpsyncError::Io(format!("document listing task failed: {e}")))??;

        warn_on_shared_names(&files);

        tracing::info!(
            documents = files.len(),
            destination = %self.store.location(),
            prefix = %self.prefix,
            concurrency = self.concurrency,
            "Uploading documents"
        );

        let outcomes: Vec<Outcome> = stream::iter(files)
            .map(|path| self.upload_one(path))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = UploadReport::new(self.store.location());
        for outcome in outcomes {
            match outcome {
                Outcome::Uploaded(key) => report.record_success(key),
                Outcome::Failed(failure) => report.record_failure(failure),
                Outcome::Skipped(key) => report.record_skip(key),
            }
        }
        report.sort();
        report.set_duration(started.elapsed().as_millis() as u64);

        if report.was_interrupted() {
            tracing::warn!(
                uploaded = report.uploaded(),
                skipped = report.skipped.len(),
                "Upload interrupted by shutdown"
            );
        }
        tracing::info!(
            uploaded = report.uploaded(),
            failed = report.failed.len(),
            duration_ms = report.duration_ms,
            "Upload batch finished"
        );

        Ok(report)
    }

    async fn upload_one(&self, path: PathBuf) -> Outcome {
        let key = object_key(&self.prefix, &walk::file_name_lossy(&path));

        if shutdown_requested(&self.shutdown) {
            return Outcome::Skipped(key);
        }

        let body = match tokio::fs::read(&path).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                let err = StorageError::ReadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                };
                tracing::error!(key = %key, error = %err, "Failed to read document");
                return Outcome::Failed(UploadFailure {
                    key,
                    path,
                    reason: err.to_string(),
                });
            }
        };

        let size = body.len();
        match self.store.put(&key, body).await {
            Ok(()) => {
                tracing::debug!(key = %key, bytes = size, "Document uploaded");
                Outcome::Uploaded(key)
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Document upload failed");
                Outcome::Failed(UploadFailure {
                    key,
                    path,
                    reason: e.to_string(),
                })
            }
        }
    }
}

fn warn_on_shared_names(files: &[PathBuf]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for path in files {
        *seen.entry(walk::file_name_lossy(path)).or_default() += 1;
    }
    for (name, count) in seen.into_iter().filter(|(_, count)| *count > 1) {
        tracing::warn!(
            file_name = %name,
            count,
            "Documents in different directories share a name and will overwrite each other"
        );
    }
}
