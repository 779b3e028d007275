//! File-backed key/value settings.
//!
//! The file is a JSON object of sections, each mapping keys to strings or
//! integers:
//!
//! ```json
//! { "Settings": { "SelectedMonitorKey": "SERIAL:ABC123", "SelectedMonitorRectLeft": 1920 } }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Rect, ShowState, WindowPlacementRecord};

const SETTINGS_SECTION: &str = "Settings";
const PLACEMENT_SECTION: &str = "WindowPlacement";
const SELECTED_MONITOR_KEY: &str = "SelectedMonitorKey";
const SELECTED_MONITOR_RECT: &str = "SelectedMonitorRect";
const DISPLAY_NAME_FORMAT: &str = "DisplayNameFormat";
const SHOW_CMD: &str = "ShowCmd";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum SettingValue {
    Int(i64),
    Text(String),
}

type Sections = BTreeMap<String, BTreeMap<String, SettingValue>>;

/// What the toggle controller and control panel need from persisted state.
pub trait SelectionStore {
    fn selected_display_key(&self) -> String;
    fn set_selected_display_key(&mut self, key: &str) -> Result<()>;

    /// Monitor rectangle saved alongside the key, for older settings files.
    fn legacy_rect(&self) -> Rect;
    fn set_legacy_rect(&mut self, rect: Rect) -> Result<()>;

    fn window_placement(&self) -> WindowPlacementRecord;
    fn set_window_placement(&mut self, placement: WindowPlacementRecord) -> Result<()>;
}

pub struct SettingsStore {
    path: PathBuf,
    sections: Sections,
}

impl SettingsStore {
    /// Load the settings file. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sections = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<Sections>(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "ignoring corrupt settings file: {e}");
                Sections::new()
            }),
            Err(_) => Sections::new(),
        };
        Self { path, sections }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_string(&self, section: &str, key: &str) -> Option<String> {
        match self.sections.get(section)?.get(key)? {
            SettingValue::Text(s) => Some(s.clone()),
            SettingValue::Int(i) => Some(i.to_string()),
        }
    }

    /// Integer value; numeric strings are accepted too.
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        match self.sections.get(section).and_then(|s| s.get(key)) {
            Some(SettingValue::Int(i)) => *i,
            Some(SettingValue::Text(s)) => s.trim().parse().unwrap_or(default),
            None => default,
        }
    }

    pub fn set_string(&mut self, section: &str, key: &str, value: &str) -> Result<()> {
        self.put(section, key, SettingValue::Text(value.to_string()));
        self.save()
    }

    pub fn set_int(&mut self, section: &str, key: &str, value: i64) -> Result<()> {
        self.put(section, key, SettingValue::Int(value));
        self.save()
    }

    /// Rectangle stored as four integer keys: `<prefix>Left`, `<prefix>Top`, ...
    pub fn get_rect(&self, section: &str, prefix: &str) -> Rect {
        let int = |edge: &str| {
            i32::try_from(self.get_int(section, &format!("{prefix}{edge}"), 0)).unwrap_or(0)
        };
        Rect::new(int("Left"), int("Top"), int("Right"), int("Bottom"))
    }

    pub fn set_rect(&mut self, section: &str, prefix: &str, rect: Rect) -> Result<()> {
        self.put_rect(section, prefix, rect);
        self.save()
    }

    /// Label format for the display combo, if the user customised it.
    pub fn display_name_format(&self) -> Option<String> {
        self.get_string(SETTINGS_SECTION, DISPLAY_NAME_FORMAT)
            .filter(|f| !f.trim().is_empty())
    }

    fn put(&mut self, section: &str, key: &str, value: SettingValue) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn put_rect(&mut self, section: &str, prefix: &str, rect: Rect) {
        for (edge, value) in [
            ("Left", rect.left),
            ("Top", rect.top),
            ("Right", rect.right),
            ("Bottom", rect.bottom),
        ] {
            self.put(section, &format!("{prefix}{edge}"), SettingValue::Int(i64::from(value)));
        }
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.sections)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SelectionStore for SettingsStore {
    fn selected_display_key(&self) -> String {
        self.get_string(SETTINGS_SECTION, SELECTED_MONITOR_KEY)
            .unwrap_or_default()
    }

    fn set_selected_display_key(&mut self, key: &str) -> Result<()> {
        self.set_string(SETTINGS_SECTION, SELECTED_MONITOR_KEY, key)
    }

    fn legacy_rect(&self) -> Rect {
        self.get_rect(SETTINGS_SECTION, SELECTED_MONITOR_RECT)
    }

    fn set_legacy_rect(&mut self, rect: Rect) -> Result<()> {
        self.set_rect(SETTINGS_SECTION, SELECTED_MONITOR_RECT, rect)
    }

    fn window_placement(&self) -> WindowPlacementRecord {
        WindowPlacementRecord {
            normal_rect: self.get_rect(PLACEMENT_SECTION, ""),
            show_state: ShowState::from_i64(self.get_int(PLACEMENT_SECTION, SHOW_CMD, 1)),
        }
    }

    fn set_window_placement(&mut self, placement: WindowPlacementRecord) -> Result<()> {
        self.put_rect(PLACEMENT_SECTION, "", placement.normal_rect);
        self.put(
            PLACEMENT_SECTION,
            SHOW_CMD,
            SettingValue::Int(placement.show_state.as_i64()),
        );
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::open(dir.path().join("settings.json"))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.selected_display_key(), "");
        assert_eq!(store.legacy_rect(), Rect::default());
        assert!(!store.window_placement().is_valid());
        assert_eq!(store.display_name_format(), None);
    }

    #[test]
    fn selection_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.set_selected_display_key("SERIAL:ABC123").unwrap();
        store.set_legacy_rect(Rect::new(1920, 0, 3840, 1080)).unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.selected_display_key(), "SERIAL:ABC123");
        assert_eq!(reopened.legacy_rect(), Rect::new(1920, 0, 3840, 1080));
    }

    #[test]
    fn window_placement_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let placement = WindowPlacementRecord {
            normal_rect: Rect::new(-200, 40, 100, 240),
            show_state: ShowState::Maximized,
        };
        store.set_window_placement(placement).unwrap();
        assert_eq!(store_in(&dir).window_placement(), placement);
    }

    #[test]
    fn corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), b"{not json").unwrap();
        let store = store_in(&dir);
        assert_eq!(store.selected_display_key(), "");
    }

    #[test]
    fn numeric_strings_read_as_integers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            br#"{"Settings":{"SelectedMonitorRectLeft":"1920","SelectedMonitorRectRight":3840,"SelectedMonitorRectBottom":"x"}}"#,
        )
        .unwrap();
        let store = store_in(&dir);
        assert_eq!(store.legacy_rect(), Rect::new(1920, 0, 3840, 0));
        assert_eq!(store.get_int("Settings", "SelectedMonitorRectLeft", -1), 1920);
        assert_eq!(store.get_int("Settings", "Missing", -1), -1);
    }

    #[test]
    fn out_of_range_edges_read_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            br#"{"Settings":{"SelectedMonitorRectLeft":4294967296,"SelectedMonitorRectTop":"-2147483649","SelectedMonitorRectRight":-2147483648,"SelectedMonitorRectBottom":1080}}"#,
        )
        .unwrap();
        let store = store_in(&dir);
        assert_eq!(store.legacy_rect(), Rect::new(0, 0, i32::MIN, 1080));
    }

    #[test]
    fn file_layout_is_sectioned_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.set_string("Settings", "DisplayNameFormat", "{FriendlyName} {Size}").unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["Settings"]["DisplayNameFormat"], "{FriendlyName} {Size}");
        assert_eq!(store.display_name_format().as_deref(), Some("{FriendlyName} {Size}"));
    }
}
