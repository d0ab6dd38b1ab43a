// Error kinds surfaced by the sampler, store, and query engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Store cannot be reached, is not initialized, or rejected the statement.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    /// Caller supplied an out-of-range index or malformed parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Host probe failed (lock poisoned, blocking task died, unknown mount).
    #[error("host probe failed: {0}")]
    Probe(String),
    #[error("query deadline exceeded")]
    Timeout,
}

impl From<sqlx::Error> for MonitorError {
    fn from(e: sqlx::Error) -> Self {
        MonitorError::StoreUnavailable(e.to_string())
    }
}

impl From<tokio::task::JoinError> for MonitorError {
    fn from(e: tokio::task::JoinError) -> Self {
        MonitorError::Probe(format!("sysinfo task join: {}", e))
    }
}

/// Awaits a background task at shutdown. A panic or cancellation is logged
/// rather than dropped; returns whether the task ended cleanly.
pub async fn join_background(task: &'static str, handle: tokio::task::JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, task, "background task ended abnormally");
            false
        }
    }
}
