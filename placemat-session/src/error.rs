//! Error types for session operations.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while driving a tracking session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// World tracking is not available on this platform.
    #[error("World tracking is not supported on this platform")]
    Unsupported,

    /// The backend could not start the capture session.
    #[error("Capture session failed to start: {0}")]
    Start(String),
}
