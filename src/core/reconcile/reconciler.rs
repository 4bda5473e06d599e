//! Local vs remote listing comparison

use super::report::ReconciliationReport;
use crate::adapters::storage::{key_basename, DocumentStore};
use crate::core::upload::DOCUMENT_SUFFIX;
use crate::core::walk;
use crate::domain::{AmpsyncError, Result};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Compares a local document directory with a store prefix
pub struct Reconciler {
    store: Arc<dyn DocumentStore>,
    prefix: String,
}

impl Reconciler {
    pub fn new(store: Arc<dyn DocumentStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// List both sides and report local documents absent remotely
    ///
    /// # Errors
    ///
    /// Fails if the local directory cannot be walked or the remote listing
    /// fails. Missing documents are not an error.
    pub async fn reconcile(&self, document_dir: &Path) -> Result<ReconciliationReport> {
        let started = Instant::now();

        let dir = document_dir.to_path_buf();
        let local = tokio::task::spawn_blocking(move || local_document_names(&dir))
            .await
            .map_err(|e| AmpsyncError::Io(format!("document listing task failed: {e}")))??;

        let keys = self.store.list_keys(&self.prefix).await?;
        let remote: HashSet<String> = keys.iter().map(|k| key_basename(k).to_string()).collect();

        let mut report = ReconciliationReport::new(self.store.location(), self.prefix.clone());
        report.local_count = local.len();
        report.remote_count = keys.len();
        report.missing = find_missing(&local, &remote);
        report.presence = local
            .iter()
            .map(|name| (name.clone(), remote.contains(name.as_str())))
            .collect();
        report.duration_ms = started.elapsed().as_millis() as u64;

        if report.is_complete() {
            tracing::info!(
                local = report.local_count,
                remote = report.remote_count,
                "Reconciliation complete, nothing missing"
            );
        } else {
            tracing::warn!(
                local = report.local_count,
                remote = report.remote_count,
                missing = report.missing.len(),
                "Documents missing from remote store"
            );
            for name in &report.missing {
                tracing::warn!(file_name = %name, "Missing remotely");
            }
        }

        Ok(report)
    }
}

/// Local names absent from the remote set, in sorted order
pub fn find_missing(local: &BTreeSet<String>, remote: &HashSet<String>) -> Vec<String> {
    local
        .iter()
        .filter(|name| !remote.contains(name.as_str()))
        .cloned()
        .collect()
}

fn local_document_names(dir: &Path) -> std::io::Result<BTreeSet<String>> {
    Ok(walk::files_with_suffix(dir, DOCUMENT_SUFFIX)?
        .iter()
        .map(|path| walk::file_name_lossy(path))
        .collect())
}
