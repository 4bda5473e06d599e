//! Intermediate artifacts handed from one pipeline stage to the next

use serde::Serialize;
use std::path::{Path, PathBuf};

/// The raw export archive written by the exporter
///
/// Owned by the exporter until the unpacker consumes it; the unpacker deletes
/// the file once every record has been decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveArtifact {
    /// Location of the archive inside the workspace
    pub path: PathBuf,

    /// Size of the response body written to disk
    pub size_bytes: u64,
}

impl ArchiveArtifact {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The JSON documents produced by the unpacker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedDocumentSet {
    /// Directory holding the decoded documents
    pub directory: PathBuf,

    /// Number of documents decoded, one per compressed record
    pub count: usize,
}

impl DecodedDocumentSet {
    pub fn new(directory: impl Into<PathBuf>, count: usize) -> Self {
        Self {
            directory: directory.into(),
            count,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
