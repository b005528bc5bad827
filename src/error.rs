//! Error types for Fastwise

use thiserror::Error;

/// Errors that can occur while tracking fasts
#[derive(Debug, Error)]
pub enum FastingError {
    /// Operation invoked in the wrong session state (e.g. starting an active fast)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed input such as a bad ratio string or a non-positive weight
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Remote store or local cache could not be reached or rejected a write
    #[error("Sync failed: {0}")]
    Sync(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FastingError {
    /// Stable machine-readable code, used by the CLI and FFI error reports
    pub fn code(&self) -> &'static str {
        match self {
            FastingError::InvalidState(_) => "INVALID_STATE",
            FastingError::Validation(_) => "VALIDATION_ERROR",
            FastingError::Sync(_) => "SYNC_ERROR",
            FastingError::Json(_) => "JSON_ERROR",
            FastingError::Io(_) => "IO_ERROR",
        }
    }
}
