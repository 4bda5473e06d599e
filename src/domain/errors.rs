//! Domain error types
//!
//! This module defines the error hierarchy for ampsync. Stage errors are kept
//! separate so the coordinator can tell which stage failed and why, and none of
//! them expose third-party types.

use std::path::PathBuf;
use thiserror::Error;

/// Main ampsync error type
///
/// This is the primary error type used throughout the application.
/// It wraps the per-stage error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum AmpsyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Export (download) stage errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Unpack (archive extraction) stage errors
    #[error("Unpack error: {0}")]
    Unpack(#[from] UnpackError),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Workspace provisioning errors
    #[error("Workspace error: {0}")]
    Workspace(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The run was interrupted by a shutdown signal
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl AmpsyncError {
    /// Whether this error was caused by a shutdown request rather than a fault
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            AmpsyncError::Cancelled(_) | AmpsyncError::Export(ExportError::Cancelled)
        )
    }
}

/// Export stage errors
///
/// Network failures are retried by the exporter; the variants here are what
/// is left once it gives up.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Transport-level failure (DNS, connect, TLS, timeout, body read)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The endpoint answered with a non-success status
    #[error("Export endpoint returned {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Every attempt failed
    #[error("Export failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// The archive was fetched but could not be written locally (not retried)
    #[error("Failed to write archive to {}: {message}", .path.display())]
    WriteFailed { path: PathBuf, message: String },

    /// Shutdown requested while fetching or backing off
    #[error("Export cancelled by shutdown signal")]
    Cancelled,
}

/// Unpack stage errors
///
/// Any of these fails the whole stage; partial output is never reported.
#[derive(Debug, Error)]
pub enum UnpackError {
    /// The archive file is missing or unreadable
    #[error("Archive not readable at {}: {message}", .path.display())]
    ArchiveUnreadable { path: PathBuf, message: String },

    /// The archive is not a valid zip or could not be extracted
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    /// No digit-named day folder at the archive root
    #[error("No day folder found in {}", .0.display())]
    NoDayFolder(PathBuf),

    /// More than one digit-named folder at the archive root
    #[error("Ambiguous day folder, found: {}", .0.join(", "))]
    AmbiguousDayFolder(Vec<String>),

    /// Two records decode to the same output file name
    #[error("Duplicate record name in archive: {0}")]
    DuplicateRecord(String),

    /// A record could not be gunzipped
    #[error("Failed to decompress {}: {message}", .file.display())]
    Decompression { file: PathBuf, message: String },

    /// Filesystem failure while staging or writing output
    #[error("I/O failure during unpack: {0}")]
    Io(String),

    /// The blocking worker panicked or was cancelled
    #[error("Unpack task failed: {0}")]
    TaskFailed(String),
}

/// Object storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage backend could not be configured
    #[error("Invalid storage configuration: {0}")]
    Configuration(String),

    /// A single object upload failed
    #[error("Upload of {key} failed: {message}")]
    UploadFailed { key: String, message: String },

    /// A local document could not be read for upload
    #[error("Failed to read {}: {message}", .path.display())]
    ReadFailed { path: PathBuf, message: String },

    /// Listing objects under a prefix failed
    #[error("Listing {prefix} failed: {message}")]
    ListFailed { prefix: String, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for AmpsyncError {
    fn from(err: std::io::Error) -> Self {
        AmpsyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AmpsyncError {
    fn from(err: serde_json::Error) -> Self {
        AmpsyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AmpsyncError {
    fn from(err: toml::de::Error) -> Self {
        AmpsyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<std::io::Error> for UnpackError {
    fn from(err: std::io::Error) -> Self {
        UnpackError::Io(err.to_string())
    }
}
