//! Error taxonomy for stopwatch construction and commands

use std::time::Duration;

/// Errors returned synchronously by the stopwatch API.
///
/// Every variant is a precondition failure: nothing is retried internally and
/// the stopwatch stays usable (apart from `AlreadyStarted`, which only a fresh
/// instance can avoid).
#[derive(Debug, thiserror::Error)]
pub enum StopwatchError {
    #[error("invalid duration")]
    InvalidDuration { duration: Duration },

    #[error("ticker is not in stopped state")]
    NotStopped,

    #[error("ticker is not in running state")]
    NotRunning,

    #[error("ticker is not in paused state")]
    NotPaused,

    #[error("ticker has already been started")]
    AlreadyStarted,

    #[error("no tokio runtime is available to drive the countdown")]
    NoRuntime,

    #[error("failed to register signal handlers: {0}")]
    Signals(#[from] std::io::Error),
}
