//! Reconciliation report structures

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of comparing local documents with remote objects
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    /// When the comparison was made
    pub reconciled_at: DateTime<Utc>,

    /// Store that was listed, e.g. `s3://bucket`
    pub location: String,

    /// Key prefix that was listed
    pub prefix: String,

    /// Number of local documents
    pub local_count: usize,

    /// Number of remote objects under the prefix
    pub remote_count: usize,

    /// Presence on the remote side for every local file name
    pub presence: BTreeMap<String, bool>,

    /// Local file names with no remote counterpart, sorted
    pub missing: Vec<String>,

    /// Duration of reconciliation in milliseconds
    pub duration_ms: u64,
}

impl ReconciliationReport {
    pub fn new(location: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            reconciled_at: Utc::now(),
            location: location.into(),
            prefix: prefix.into(),
            local_count: 0,
            remote_count: 0,
            presence: BTreeMap::new(),
            missing: Vec::new(),
            duration_ms: 0,
        }
    }

    /// True when every local document exists remotely
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("🔍 Reconciliation Report\n");
        summary.push_str(&format!("  Reconciled at: {}\n", self.reconciled_at));
        summary.push_str(&format!("  Remote: {}/{}\n", self.location, self.prefix));
        summary.push_str(&format!("  Duration: {} ms\n", self.duration_ms));
        summary.push_str(&format!("  Local documents: {}\n", self.local_count));
        summary.push_str(&format!("  Remote objects: {}\n", self.remote_count));

        if self.missing.is_empty() {
            summary.push_str("  ✅ All local documents present remotely\n");
        } else {
            summary.push_str(&format!("  ❌ Missing remotely: {}\n", self.missing.len()));
            for name in &self.missing {
                summary.push_str(&format!("     - {name}\n"));
            }
        }

        summary
    }
}
