//! Error types for the audit capture pipeline
//!
//! Every failure in the pipeline maps onto one of three kinds: a configuration
//! defect, a lifecycle notification that did not carry the data it needed, or a
//! store that refused the append.

use thiserror::Error;

use crate::audit::Action;

/// The main error type for audit capture
#[derive(Error, Debug)]
pub enum AuditError {
    /// Unknown action or malformed settings. Never recoverable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A diff was requested without the snapshot the action needs
    #[error("Missing data for `{action}`: {detail}")]
    MissingData { action: Action, detail: String },

    /// The durable store could not complete the append
    #[error("Audit write failed: {0}")]
    WriteFailure(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl AuditError {
    /// Create a "missing data" error for the given action
    pub fn missing_data(action: Action, detail: impl Into<String>) -> Self {
        Self::MissingData {
            action,
            detail: detail.into(),
        }
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is a missing data error
    pub fn is_missing_data(&self) -> bool {
        matches!(self, Self::MissingData { .. })
    }

    /// Check if this is a write failure
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Self::WriteFailure(_))
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for AuditError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result type alias for audit operations
pub type AuditResult<T> = Result<T, AuditError>;
