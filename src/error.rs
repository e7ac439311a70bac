//! Error types for the savetick crate.

/// Top-level error type for the autosave scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SaveTickError {
    /// Malformed interval value (bad field count or non-integer component).
    #[error("interval error: {0}")]
    Interval(String),

    /// Refresh-rate store read/write error.
    #[error("store error: {0}")]
    Store(String),

    /// Scheduler lifecycle error (double start, restart after stop).
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// Operator console I/O error.
    #[error("console error: {0}")]
    Console(String),

    /// Failure of the injected save action.
    #[error("save action error: {0}")]
    Action(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SaveTickError>;
