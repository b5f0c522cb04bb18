//! Error types shared across PalmCursor crates.

use std::path::PathBuf;

/// Top-level error type for PalmCursor operations.
#[derive(Debug, thiserror::Error)]
pub enum PalmError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PalmError.
pub type PalmResult<T> = Result<T, PalmError>;

impl PalmError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Whether this error came from a rejected tunable.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

/// Fail with a configuration error unless `value` is finite and strictly positive.
pub fn ensure_positive(name: &str, value: f64) -> PalmResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PalmError::config(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

/// Fail with a configuration error unless `value` lies within `[min, max]`.
pub fn ensure_in_range(name: &str, value: f64, min: f64, max: f64) -> PalmResult<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(PalmError::config(format!(
            "{name} must be within [{min}, {max}], got {value}"
        )))
    }
}
