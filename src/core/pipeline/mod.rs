//! Pipeline orchestration
//!
//! Runs the stages in order for one window inside a fresh workspace:
//!
//! 1. **Export**: download the archive, with retry
//! 2. **Unpack**: decode every record to a JSON document
//! 3. **Upload**: push the documents to the object store
//! 4. **Reconcile**: confirm every document exists remotely
//!
//! A stage failure skips the remaining stages. The workspace is released on
//! every path. The outcome is a [`RunSummary`].

pub mod coordinator;
pub mod summary;

pub use coordinator::{PipelineCoordinator, RunOptions};
pub use summary::{RunSummary, Stage, StageFailure};
