//! Upload stage
//!
//! Pushes every decoded JSON document to the object store under
//! `<prefix>/<file name>`, a bounded number at a time. A failed upload is
//! recorded in the [`UploadReport`] and does not stop the batch.

pub mod report;
pub mod uploader;

pub use report::{UploadFailure, UploadReport};
pub use uploader::{Uploader, DOCUMENT_SUFFIX};
