//! Logging and observability
//!
//! Structured logging via `tracing`: human-readable console output plus an
//! optional JSON rolling file. The macros below keep field names consistent
//! across pipeline stages.

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a pipeline stage
///
/// ```no_run
/// use ampsync::log_stage_start;
///
/// log_stage_start!("export", "20240101T00..20240101T23");
/// ```
#[macro_export]
macro_rules! log_stage_start {
    ($stage:expr, $window:expr) => {
        tracing::info!(stage = %$stage, window = %$window, "Stage started");
    };
}

/// Log the successful end of a pipeline stage
///
/// ```no_run
/// use ampsync::log_stage_complete;
/// use std::time::Duration;
///
/// log_stage_complete!("unpack", Duration::from_millis(840));
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $duration:expr) => {
        tracing::info!(
            stage = %$stage,
            duration_ms = $duration.as_millis() as u64,
            "Stage completed"
        );
    };
}

/// Log a retry attempt
///
/// ```no_run
/// use ampsync::log_retry_attempt;
///
/// log_retry_attempt!(1, 3, 1000u64, "Export endpoint returned 503");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
