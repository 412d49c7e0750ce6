//! Layered error definitions
//!
//! Categorized by source: config / backend / general

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Backend Errors =====
    /// A single backend invocation failed
    #[error(transparent)]
    Backend(#[from] BackendFailure),

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Terminal failure of one backend invocation.
///
/// Never retried. The replicator absorbs it and the backend simply drops out
/// of its race.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("backend '{backend}' failed: {message}")]
pub struct BackendFailure {
    pub backend: String,
    pub message: String,
}

impl BackendFailure {
    /// Create a backend failure
    pub fn new(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            message: message.into(),
        }
    }
}
