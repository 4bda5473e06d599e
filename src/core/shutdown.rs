//! Cooperative cancellation
//!
//! The binary flips a `watch::channel(false)` to `true` on SIGINT/SIGTERM.
//! Stages poll [`shutdown_requested`] between units of work and race
//! [`wait_for_shutdown`] against anything that can block for long.

use tokio::sync::watch;

/// Whether shutdown has been requested
pub fn shutdown_requested(signal: &watch::Receiver<bool>) -> bool {
    *signal.borrow()
}

/// Resolves once shutdown is requested
///
/// If the sender is dropped without ever signalling, this never resolves.
pub async fn wait_for_shutdown(mut signal: watch::Receiver<bool>) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// A receiver that never signals, for callers without a signal handler
pub fn no_shutdown() -> watch::Receiver<bool> {
    watch::channel(false).1
}
