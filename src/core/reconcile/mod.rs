//! Reconciliation
//!
//! Compares the decoded documents on disk with the objects under the
//! configured prefix and reports any document missing remotely. Both sides
//! are compared by file name only, the same flat namespace the uploader
//! writes into.

pub mod reconciler;
pub mod report;

pub use reconciler::{find_missing, Reconciler};
pub use report::ReconciliationReport;
