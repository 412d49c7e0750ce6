//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Only API misuse is a hard error. Deadline expiry and backend failures are
/// reported through `DispatchResult`, never through this type.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Caller contract violation (empty backend set, zero deadline)
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The race was cancelled before any backend succeeded
    #[error("race cancelled before any backend succeeded")]
    Cancelled,
}

impl DispatcherError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
