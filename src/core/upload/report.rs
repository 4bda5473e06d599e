//! Upload report structures

use serde::Serialize;
use std::path::PathBuf;

/// Outcome of one upload batch
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    /// Where the documents were sent, e.g. `s3://bucket`
    pub location: String,

    /// Keys written successfully
    pub succeeded: Vec<String>,

    /// Uploads that failed, with cause
    pub failed: Vec<UploadFailure>,

    /// Keys never attempted because shutdown was requested
    pub skipped: Vec<String>,

    /// Duration of the batch in milliseconds
    pub duration_ms: u64,
}

/// Details of a failed upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadFailure {
    /// Object key the document was meant to land under
    pub key: String,

    /// Local document path
    pub path: PathBuf,

    /// Reason for failure
    pub reason: String,
}

impl UploadReport {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn record_success(&mut self, key: String) {
        self.succeeded.push(key);
    }

    pub fn record_failure(&mut self, failure: UploadFailure) {
        self.failed.push(failure);
    }

    pub fn record_skip(&mut self, key: String) {
        self.skipped.push(key);
    }

    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Number of documents uploaded
    pub fn uploaded(&self) -> usize {
        self.succeeded.len()
    }

    /// Number of documents considered, whatever their outcome
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }

    /// True when every document was uploaded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Whether the batch stopped early on shutdown
    pub fn was_interrupted(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// Sort key lists so reports are stable regardless of completion order
    pub(crate) fn sort(&mut self) {
        self.succeeded.sort();
        self.skipped.sort();
        self.failed.sort_by(|a, b| a.key.cmp(&b.key));
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📤 Upload Report\n");
        summary.push_str(&format!("  Destination: {}\n", self.location));
        summary.push_str(&format!("  Duration: {} ms\n", self.duration_ms));
        summary.push_str(&format!("  Documents: {}\n", self.total()));
        summary.push_str(&format!("  ✅ Uploaded: {}\n", self.uploaded()));
        summary.push_str(&format!("  ❌ Failed: {}\n", self.failed.len()));
        if self.was_interrupted() {
            summary.push_str(&format!("  ⏭️  Skipped: {}\n", self.skipped.len()));
        }

        if !self.failed.is_empty() {
            summary.push_str("\n❌ Failures:\n");
            for (i, failure) in self.failed.iter().enumerate() {
                summary.push_str(&format!("  {}. {}\n", i + 1, failure.key));
                summary.push_str(&format!("     File: {}\n", failure.path.display()));
                summary.push_str(&format!("     Reason: {}\n", failure.reason));
            }
        }

        summary
    }
}
