//! Per-run temporary workspace
//!
//! Layout under a uniquely named temp directory:
//!
//! ```text
//! ampsync-XXXXXX/
//!   raw_zip/           downloaded archive
//!   extraction_temp/   archive contents while unpacking
//!   json/              decoded documents
//! ```
//!
//! The tree is removed by [`Workspace::release`], or on drop if a run exits
//! early. Removal is best-effort: errors, including an already-missing
//! directory, are logged and swallowed.

use crate::domain::{AmpsyncError, Result, TimeWindow};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const RAW_DIR: &str = "raw_zip";
const STAGING_DIR: &str = "extraction_temp";
const OUTPUT_DIR: &str = "json";

/// Exclusively owned filesystem scope for one run
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    root: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace, under `parent` if given, else the system temp dir
    ///
    /// # Errors
    ///
    /// Returns [`AmpsyncError::Workspace`] if the directories cannot be created.
    pub fn acquire(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ampsync-");

        let dir = match parent {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| workspace_error(parent, e))?;
                builder.tempdir_in(parent)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| AmpsyncError::Workspace(format!("failed to create temp directory: {e}")))?;

        let root = dir.path().to_path_buf();
        for sub in [RAW_DIR, STAGING_DIR, OUTPUT_DIR] {
            let path = root.join(sub);
            fs::create_dir_all(&path).map_err(|e| workspace_error(&path, e))?;
        }

        tracing::info!(path = %root.display(), "Temporary workspace created");

        Ok(Self {
            dir: Some(dir),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where downloaded archives go
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join(RAW_DIR)
    }

    /// Where archives are extracted before decoding
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    /// Where decoded documents go
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    /// Archive location for a window; depends only on the window's end
    pub fn archive_path(&self, window: &TimeWindow) -> PathBuf {
        self.raw_dir().join(window.archive_file_name())
    }

    /// Remove the workspace tree
    pub fn release(mut self) {
        if let Some(dir) = self.dir.take() {
            remove_quietly(dir);
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            tracing::debug!(path = %self.root.display(), "Workspace dropped without release");
            remove_quietly(dir);
        }
    }
}

fn remove_quietly(dir: TempDir) {
    let path = dir.path().to_path_buf();
    match dir.close() {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Temporary workspace cleaned up");
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Temporary workspace already removed");
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary workspace");
        }
    }
}

fn workspace_error(path: &Path, err: io::Error) -> AmpsyncError {
    AmpsyncError::Workspace(format!("failed to create {}: {err}", path.display()))
}
