//! Configuration file helpers.
//!
//! The pipeline itself never reads ambient state; tools load a config
//! value here and hand it to the pipeline constructor explicitly.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PalmError, PalmResult};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "palmcursor_gesture_core=trace,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load a JSON config value from `path`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> PalmResult<T> {
    if !path.exists() {
        return Err(PalmError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        PalmError::config(format!("Failed to parse config at {}: {e}", path.display()))
    })
}

/// Load a JSON config from `path` if given, else from the standard
/// location if it exists, else fall back to `T::default()`.
pub fn load_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> PalmResult<T> {
    if let Some(path) = path {
        return load_json(path);
    }
    let standard = config_file_path();
    if standard.exists() {
        tracing::debug!(path = %standard.display(), "Loading config from standard location");
        return load_json(&standard);
    }
    Ok(T::default())
}

/// Save a config value as pretty JSON.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> PalmResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("palmcursor").join("config.json")
}
