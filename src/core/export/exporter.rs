//! Export stage: fetch the archive for a window, with retry
//!
//! Each failed attempt is logged and followed by an exponential backoff wait
//! (see [`RetryConfig::delay_after_attempt`]). There is no wait after the
//! last attempt. Waits and in-flight requests are abandoned as soon as
//! shutdown is requested.

use crate::adapters::amplitude::AmplitudeClient;
use crate::config::{AmplitudeConfig, RetryConfig};
use crate::core::shutdown::{shutdown_requested, wait_for_shutdown};
use crate::core::workspace::Workspace;
use crate::domain::{ArchiveArtifact, ExportError, Result, TimeWindow};
use crate::log_retry_attempt;
use bytes::Bytes;
use std::path::Path;
use std::time::Duration;
use tokio::sync::watch;

/// Downloads the export archive into the workspace
pub struct Exporter {
    client: AmplitudeClient,
    retry: RetryConfig,
    shutdown: watch::Receiver<bool>,
}

impl Exporter {
    pub fn new(client: AmplitudeClient, retry: RetryConfig, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            client,
            retry,
            shutdown,
        }
    }

    /// Build the client and retry policy from the `[amplitude]` section
    pub fn from_config(config: &AmplitudeConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let client = AmplitudeClient::new(config)?;
        Ok(Self::new(client, config.retry.clone(), shutdown))
    }

    /// Fetch the archive for `window` and write it to the workspace
    ///
    /// On success exactly one file exists at
    /// [`Workspace::archive_path`]. On failure no file is left behind.
    ///
    /// # Errors
    ///
    /// - [`ExportError::RetriesExhausted`] when every attempt failed
    /// - [`ExportError::WriteFailed`] when the body could not be saved (not retried)
    /// - [`ExportError::Cancelled`] when shutdown was requested
    pub async fn export(
        &self,
        window: &TimeWindow,
        workspace: &Workspace,
    ) -> std::result::Result<ArchiveArtifact, ExportError> {
        let path = workspace.archive_path(window);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            if shutdown_requested(&self.shutdown) {
                tracing::warn!(attempt, "Export cancelled before request");
                return Err(ExportError::Cancelled);
            }

            attempt += 1;
            tracing::debug!(attempt, max_attempts, window = %window, "Requesting export");

            let fetched = tokio::select! {
                result = self.client.fetch_export(window) => result,
                _ = wait_for_shutdown(self.shutdown.clone()) => {
                    tracing::warn!(attempt, "Export request abandoned on shutdown");
                    return Err(ExportError::Cancelled);
                }
            };

            match fetched {
                Ok(body) => {
                    tracing::info!(attempt, bytes = body.len(), "Export downloaded");
                    return write_archive(&path, body).await;
                }
                Err(e) => {
                    tracing::error!(attempt, max_attempts, error = %e, "Export attempt failed");

                    if attempt >= max_attempts {
                        return Err(ExportError::RetriesExhausted {
                            attempts: attempt,
                            last_error: e.to_string(),
                        });
                    }

                    let delay = self.retry.delay_after_attempt(attempt);
                    log_retry_attempt!(attempt, max_attempts, delay.as_millis() as u64, e);
                    self.backoff(delay).await?;
                }
            }
        }
    }

    async fn backoff(&self, delay: Duration) -> std::result::Result<(), ExportError> {
        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            _ = wait_for_shutdown(self.shutdown.clone()) => {
                tracing::warn!("Export backoff interrupted by shutdown");
                Err(ExportError::Cancelled)
            }
        }
    }
}

async fn write_archive(path: &Path, body: Bytes) -> std::result::Result<ArchiveArtifact, ExportError> {
    let write_failed = |e: std::io::Error| ExportError::WriteFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    if let Err(e) = tokio::fs::write(path, &body).await {
        let _ = tokio::fs::remove_file(path).await;
        tracing::error!(path = %path.display(), error = %e, "Failed to write archive");
        return Err(write_failed(e));
    }

    tracing::info!(path = %path.display(), bytes = body.len(), "Archive saved");
    Ok(ArchiveArtifact::new(path, body.len() as u64))
}
