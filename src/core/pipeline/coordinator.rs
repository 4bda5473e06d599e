//! Pipeline coordinator - runs every stage for one window
//!
//! The coordinator owns the configuration, the exporter, and the document
//! store, and converts stage errors into a [`RunSummary`].

use super::summary::{RunSummary, Stage};
use crate::adapters::storage::{DocumentStore, ObjectStoreClient};
use crate::config::AmpsyncConfig;
use crate::core::export::Exporter;
use crate::core::reconcile::Reconciler;
use crate::core::shutdown::shutdown_requested;
use crate::core::unpack;
use crate::core::upload::Uploader;
use crate::core::workspace::Workspace;
use crate::domain::{AmpsyncError, Result, TimeWindow};
use crate::{log_stage_complete, log_stage_start};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Per-run switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Export and unpack only
    pub dry_run: bool,

    /// Stop after upload
    pub skip_reconcile: bool,
}

type StageResult<T> = std::result::Result<T, (Stage, AmpsyncError)>;

/// Pipeline coordinator
pub struct PipelineCoordinator {
    config: AmpsyncConfig,
    exporter: Exporter,
    store: Arc<dyn DocumentStore>,
    shutdown: watch::Receiver<bool>,
}

impl PipelineCoordinator {
    /// Create a coordinator using the store selected in `[storage]`
    pub fn new(config: AmpsyncConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let store = Arc::new(ObjectStoreClient::from_config(&config.storage)?);
        Self::with_store(config, store, shutdown)
    }

    /// Create a coordinator around an existing store
    pub fn with_store(
        config: AmpsyncConfig,
        store: Arc<dyn DocumentStore>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let exporter = Exporter::from_config(&config.amplitude, shutdown.clone())?;

        Ok(Self {
            config,
            exporter,
            store,
            shutdown,
        })
    }

    /// The store documents are uploaded to
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }

    /// Run every stage for `window`
    ///
    /// Never returns an error: failures are recorded in the summary, and
    /// [`RunSummary::exit_code`] maps the outcome to a process exit code.
    pub async fn run(&self, window: TimeWindow, options: RunOptions) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::new(window, options.dry_run);

        tracing::info!(
            window = %window,
            dry_run = options.dry_run,
            skip_reconcile = options.skip_reconcile,
            "Starting run"
        );

        let parent = self.config.workspace.parent_dir.as_deref().map(Path::new);
        let workspace = match Workspace::acquire(parent) {
            Ok(workspace) => workspace,
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire workspace");
                summary.record_failure(Stage::Workspace, &e);
                let summary = summary.with_duration(started.elapsed());
                summary.log_summary();
                return summary;
            }
        };

        if let Err((stage, e)) = self
            .run_stages(&window, &workspace, options, &mut summary)
            .await
        {
            summary.record_failure(stage, &e);
        }

        workspace.release();

        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        summary
    }

    async fn run_stages(
        &self,
        window: &TimeWindow,
        workspace: &Workspace,
        options: RunOptions,
        summary: &mut RunSummary,
    ) -> StageResult<()> {
        let prefix = self.config.storage.normalized_prefix();

        // Export
        self.ensure_running(Stage::Export)?;
        log_stage_start!(Stage::Export, window);
        let stage_started = Instant::now();
        let archive = self
            .exporter
            .export(window, workspace)
            .await
            .map_err(|e| stage_failed(Stage::Export, e))?;
        summary.archive_bytes = Some(archive.size_bytes);
        log_stage_complete!(Stage::Export, stage_started.elapsed());

        // Unpack
        self.ensure_running(Stage::Unpack)?;
        log_stage_start!(Stage::Unpack, window);
        let stage_started = Instant::now();
        let documents = unpack::unpack(archive.path(), workspace)
            .await
            .map_err(|e| stage_failed(Stage::Unpack, e))?;
        summary.documents = Some(documents.count);
        log_stage_complete!(Stage::Unpack, stage_started.elapsed());

        if options.dry_run {
            tracing::info!(
                documents = documents.count,
                "Dry run: skipping upload and reconciliation"
            );
            return Ok(());
        }

        // Upload
        self.ensure_running(Stage::Upload)?;
        log_stage_start!(Stage::Upload, window);
        let stage_started = Instant::now();
        let uploader = Uploader::new(
            self.store.clone(),
            prefix,
            self.config.storage.upload_concurrency,
            self.shutdown.clone(),
        );
        let report = uploader
            .upload(documents.directory())
            .await
            .map_err(|e| stage_failed(Stage::Upload, e))?;
        let interrupted = report.was_interrupted();
        summary.upload = Some(report);
        if interrupted {
            return Err(stage_failed(
                Stage::Upload,
                AmpsyncError::Cancelled("upload interrupted before every document was sent".into()),
            ));
        }
        log_stage_complete!(Stage::Upload, stage_started.elapsed());

        if options.skip_reconcile {
            tracing::info!("Reconciliation skipped");
            return Ok(());
        }

        // Reconcile
        self.ensure_running(Stage::Reconcile)?;
        log_stage_start!(Stage::Reconcile, window);
        let stage_started = Instant::now();
        let reconciler = Reconciler::new(self.store.clone(), prefix);
        let report = reconciler
            .reconcile(documents.directory())
            .await
            .map_err(|e| stage_failed(Stage::Reconcile, e))?;
        summary.reconciliation = Some(report);
        log_stage_complete!(Stage::Reconcile, stage_started.elapsed());

        Ok(())
    }

    fn ensure_running(&self, next: Stage) -> StageResult<()> {
        if shutdown_requested(&self.shutdown) {
            tracing::warn!(stage = %next, "Shutdown requested, not starting stage");
            return Err((
                next,
                AmpsyncError::Cancelled(format!("shutdown requested before {next}")),
            ));
        }
        Ok(())
    }
}

fn stage_failed(stage: Stage, error: impl Into<AmpsyncError>) -> (Stage, AmpsyncError) {
    let error = error.into();
    if error.is_cancelled() {
        tracing::warn!(stage = %stage, "Stage cancelled");
    } else {
        tracing::error!(stage = %stage, error = %error, "Stage failed, skipping remaining stages");
    }
    (stage, error)
}
