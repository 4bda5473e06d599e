//! Run summary and exit code mapping

use crate::core::reconcile::ReconciliationReport;
use crate::core::upload::UploadReport;
use crate::domain::{AmpsyncError, TimeWindow};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

pub const EXIT_SUCCESS: i32 = 0;
/// Completed, but some documents failed to upload or are missing remotely
pub const EXIT_INCOMPLETE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;
pub const EXIT_FATAL: i32 = 5;
/// Interrupted by SIGINT/SIGTERM
pub const EXIT_INTERRUPTED: i32 = 130;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Workspace,
    Export,
    Unpack,
    Upload,
    Reconcile,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Workspace => "workspace",
            Stage::Export => "export",
            Stage::Unpack => "unpack",
            Stage::Upload => "upload",
            Stage::Reconcile => "reconcile",
        };
        f.write_str(name)
    }
}

/// The stage that stopped a run, and why
#[derive(Debug, Clone, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Window the run covered
    pub window: TimeWindow,

    /// Upload and reconcile were skipped on purpose
    pub dry_run: bool,

    /// Size of the downloaded archive, once exported
    pub archive_bytes: Option<u64>,

    /// Number of documents decoded, once unpacked
    pub documents: Option<usize>,

    /// Upload outcome, if the upload stage ran
    pub upload: Option<UploadReport>,

    /// Reconciliation outcome, if the reconcile stage ran
    pub reconciliation: Option<ReconciliationReport>,

    /// The stage that stopped the run
    pub failure: Option<StageFailure>,

    /// Whether a shutdown signal ended the run early
    pub interrupted: bool,

    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn new(window: TimeWindow, dry_run: bool) -> Self {
        Self {
            window,
            dry_run,
            archive_bytes: None,
            documents: None,
            upload: None,
            reconciliation: None,
            failure: None,
            interrupted: false,
            duration_ms: 0,
        }
    }

    /// Record the error that stopped the run at `stage`
    pub fn record_failure(&mut self, stage: Stage, error: &AmpsyncError) {
        if error.is_cancelled() {
            self.interrupted = true;
        }
        self.failure = Some(StageFailure {
            stage,
            message: error.to_string(),
        });
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    /// Documents uploaded, zero if the upload stage did not run
    pub fn uploaded(&self) -> usize {
        self.upload.as_ref().map(|r| r.uploaded()).unwrap_or(0)
    }

    /// Ran every stage with no failed upload and nothing missing remotely
    pub fn is_successful(&self) -> bool {
        self.exit_code() == EXIT_SUCCESS
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            return EXIT_INTERRUPTED;
        }
        if self.failure.is_some() {
            return EXIT_FATAL;
        }

        let upload_failed = self
            .upload
            .as_ref()
            .map(|r| !r.is_complete())
            .unwrap_or(false);
        let missing = self
            .reconciliation
            .as_ref()
            .map(|r| !r.is_complete())
            .unwrap_or(false);

        if upload_failed || missing {
            EXIT_INCOMPLETE
        } else {
            EXIT_SUCCESS
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            window = %self.window,
            dry_run = self.dry_run,
            archive_bytes = self.archive_bytes.unwrap_or(0),
            documents = self.documents.unwrap_or(0),
            uploaded = self.uploaded(),
            upload_failures = self.upload.as_ref().map(|r| r.failed.len()).unwrap_or(0),
            missing = self.reconciliation.as_ref().map(|r| r.missing.len()).unwrap_or(0),
            duration_ms = self.duration_ms,
            exit_code = self.exit_code(),
            "Run finished"
        );

        if let Some(failure) = &self.failure {
            if self.interrupted {
                tracing::warn!(stage = %failure.stage, "Run interrupted by shutdown signal");
            } else {
                tracing::error!(
                    stage = %failure.stage,
                    error = %failure.message,
                    "Run stopped by stage failure"
                );
            }
        }
    }

    /// Format the summary as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Run Summary\n");
        summary.push_str(&format!("  Window: {}\n", self.window));
        summary.push_str(&format!("  Duration: {} ms\n", self.duration_ms));
        if let Some(bytes) = self.archive_bytes {
            summary.push_str(&format!("  Archive size: {bytes} bytes\n"));
        }
        if let Some(documents) = self.documents {
            summary.push_str(&format!("  Documents decoded: {documents}\n"));
        }
        if self.dry_run {
            summary.push_str("  🧪 Dry run: upload and reconciliation skipped\n");
        }
        if let Some(upload) = &self.upload {
            summary.push('\n');
            summary.push_str(&upload.format_summary());
        }
        if let Some(reconciliation) = &self.reconciliation {
            summary.push('\n');
            summary.push_str(&reconciliation.format_summary());
        }
        if let Some(failure) = &self.failure {
            summary.push('\n');
            if self.interrupted {
                summary.push_str(&format!("⚠️  Interrupted during {}\n", failure.stage));
            } else {
                summary.push_str(&format!("❌ {} failed: {}\n", failure.stage, failure.message));
            }
        }
        summary
    }
}
