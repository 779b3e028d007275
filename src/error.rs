use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that make a core operation unusable for the current call.
///
/// Expected absences (app not running, window missing, no display selected)
/// are not errors; they come back as a failed `ToggleOutcome` instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("UI Automation is unavailable: {0}")]
    Accessibility(String),

    #[error("{call} failed with status {status}")]
    DisplayConfig { call: &'static str, status: u32 },

    #[error("Monitor and display config data size mismatch ({monitors} monitors, {paths} paths)")]
    InventoryMismatch { monitors: usize, paths: usize },

    #[error("settings I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),
}
