//! Domain models and types for ampsync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Time windows** ([`TimeWindow`]) addressing one export run
//! - **Stage artifacts** ([`ArchiveArtifact`], [`DecodedDocumentSet`])
//! - **Error types** ([`AmpsyncError`], [`ExportError`], [`UnpackError`], [`StorageError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, AmpsyncError>`] or a stage
//! error that converts into it:
//!
//! ```rust
//! use ampsync::domain::{Result, TimeWindow};
//!
//! fn example() -> Result<()> {
//!     let window = TimeWindow::parse("20240101T00", "20240101T23")?;
//!     assert_eq!(window.archive_file_name(), "20240101T23_data.zip");
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod artifacts;
pub mod errors;
pub mod result;
pub mod window;

// Re-export commonly used types for convenience
pub use artifacts::{ArchiveArtifact, DecodedDocumentSet};
pub use errors::{AmpsyncError, ExportError, StorageError, UnpackError};
pub use result::Result;
pub use window::{TimeWindow, WINDOW_FORMAT};
