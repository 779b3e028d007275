use std::path::PathBuf;
use std::time::Duration;

use crate::monitor::DEFAULT_DISPLAY_NAME_FORMAT;

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SINGLE_INSTANCE_NAME: &str = "ApcProjSw";

// ─── Target application ──────────────────────────────────────────────────────

/// Identity of the conferencing app and the sub-window that gets toggled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetApp {
    pub display_name: &'static str,
    pub process_name: &'static str,
    pub window_name: &'static str,
    pub window_class: &'static str,
}

pub const ZOOM: TargetApp = TargetApp {
    display_name: "Zoom",
    process_name: "Zoom.exe",
    window_name: "Zoom Workplace",
    window_class: "ConfMultiTabContentWndClass",
};

impl Default for TargetApp {
    fn default() -> Self {
        ZOOM
    }
}

// ─── Timing ──────────────────────────────────────────────────────────────────

/// Blocking waits performed on the UI thread during a toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Sleep between checks while waiting for a minimized window to restore.
    pub restore_poll: Duration,
    /// Give up waiting for the restore after this long.
    pub restore_timeout: Duration,
    pub fade_duration: Duration,
    pub fade_frame: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            restore_poll: Duration::from_millis(10),
            restore_timeout: Duration::from_millis(500),
            fade_duration: Duration::from_millis(300),
            fade_frame: Duration::from_millis(15),
        }
    }
}

impl Timing {
    /// No sleeping at all; used by tests and by callers that skip the fade.
    pub const fn immediate() -> Self {
        Self {
            restore_poll: Duration::ZERO,
            restore_timeout: Duration::ZERO,
            fade_duration: Duration::ZERO,
            fade_frame: Duration::ZERO,
        }
    }
}

// ─── Application config ──────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub target: TargetApp,
    pub timing: Timing,
    pub display_name_format: String,
    pub settings_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target: TargetApp::default(),
            timing: Timing::default(),
            display_name_format: DEFAULT_DISPLAY_NAME_FORMAT.to_string(),
            settings_path: PathBuf::from(SETTINGS_FILE_NAME),
        }
    }
}

impl AppConfig {
    /// Settings file next to the working directory, like the installer lays it out.
    pub fn in_current_dir() -> Self {
        let settings_path = std::env::current_dir()
            .map(|dir| dir.join(SETTINGS_FILE_NAME))
            .unwrap_or_else(|_| PathBuf::from(SETTINGS_FILE_NAME));
        Self {
            settings_path,
            ..Self::default()
        }
    }
}
