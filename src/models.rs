use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Geometry ────────────────────────────────────────────────────────────────

/// Screen rectangle in virtual-desktop pixels, laid out like a Win32 `RECT`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn from_origin_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Same rule as `IsRectEmpty`: no positive area.
    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Grow outward by `dx` on the left/right edges and `dy` on the top/bottom edges.
    pub const fn inflate(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.left - dx,
            self.top - dy,
            self.right + dx,
            self.bottom + dy,
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.top, self.right, self.bottom)
    }
}

// ─── Displays ────────────────────────────────────────────────────────────────

/// Where a display sits relative to the primary display's usable area.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RelativePosition {
    #[default]
    Primary,
    Left,
    Right,
    Above,
    Below,
    Overlap,
}

impl RelativePosition {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Left => "left",
            Self::Right => "right",
            Self::Above => "above",
            Self::Below => "below",
            Self::Overlap => "overlap",
        }
    }
}

impl fmt::Display for RelativePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physical display as seen by the current inventory pass.
///
/// `id` follows the OS output-path index and can change across reboots;
/// `key` is the durable identity persisted by the selection store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayRecord {
    pub id: u32,
    pub is_primary: bool,
    pub monitor_rect: Rect,
    pub work_rect: Rect,
    pub friendly_name: String,
    /// Device interface path, e.g. `\\?\DISPLAY#GSM5B08#...#{e6f07b5f-...}`
    pub device_path: String,
    /// GDI device name, e.g. `\\.\DISPLAY2`
    pub device_name: String,
    pub serial_number: String,
    pub key: String,
    pub relative_position: RelativePosition,
}

impl DisplayRecord {
    /// Usable area, falling back to the full monitor when the work area is empty.
    pub const fn usable_rect(&self) -> Rect {
        if self.work_rect.is_empty() {
            self.monitor_rect
        } else {
            self.work_rect
        }
    }
}

// ─── Target window state ─────────────────────────────────────────────────────

/// Geometry captured right before the target window is moved away, so a later
/// toggle can put it back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SavedGeometry {
    pub rect: Rect,
    pub was_minimized: bool,
}

/// Outer and client sizes of a window, used to compute its border thickness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameMetrics {
    pub outer_width: i32,
    pub outer_height: i32,
    pub client_width: i32,
    pub client_height: i32,
}

/// Liveness of the target application as seen by the process probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessStatus {
    NotRunning,
    SingleWindowOnly,
    Running,
}

impl ProcessStatus {
    /// The conferencing app only spawns its second process in dual-monitor mode.
    pub const fn from_count(count: usize) -> Self {
        match count {
            0 => Self::NotRunning,
            1 => Self::SingleWindowOnly,
            _ => Self::Running,
        }
    }
}

// ─── Persisted state ─────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

impl ShowState {
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Normal => 1,
            Self::Minimized => 2,
            Self::Maximized => 3,
        }
    }

    pub const fn from_i64(value: i64) -> Self {
        match value {
            2 => Self::Minimized,
            3 => Self::Maximized,
            _ => Self::Normal,
        }
    }
}

/// Last known placement of the control panel window.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowPlacementRecord {
    pub normal_rect: Rect,
    pub show_state: ShowState,
}

impl WindowPlacementRecord {
    pub const fn is_valid(&self) -> bool {
        self.normal_rect.width() > 0 && self.normal_rect.height() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_emptiness_follows_win32_rules() {
        assert!(Rect::default().is_empty());
        assert!(Rect::new(10, 10, 10, 20).is_empty());
        assert!(Rect::new(10, 10, 5, 20).is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
    }

    #[test]
    fn inflate_grows_every_edge() {
        let r = Rect::new(0, 0, 1920, 1080).inflate(8, 4);
        assert_eq!(r, Rect::new(-8, -4, 1928, 1084));
        assert_eq!(r.width(), 1936);
        assert_eq!(r.height(), 1088);
    }

    #[test]
    fn usable_rect_falls_back_to_monitor() {
        let mut record = DisplayRecord {
            monitor_rect: Rect::new(0, 0, 1920, 1080),
            ..Default::default()
        };
        assert_eq!(record.usable_rect(), record.monitor_rect);
        record.work_rect = Rect::new(0, 0, 1920, 1040);
        assert_eq!(record.usable_rect(), Rect::new(0, 0, 1920, 1040));
    }

    #[test]
    fn process_status_thresholds() {
        assert_eq!(ProcessStatus::from_count(0), ProcessStatus::NotRunning);
        assert_eq!(ProcessStatus::from_count(1), ProcessStatus::SingleWindowOnly);
        assert_eq!(ProcessStatus::from_count(2), ProcessStatus::Running);
        assert_eq!(ProcessStatus::from_count(7), ProcessStatus::Running);
    }

    #[test]
    fn placement_validity_requires_area() {
        let mut record = WindowPlacementRecord::default();
        assert!(!record.is_valid());
        record.normal_rect = Rect::new(100, 100, 400, 300);
        assert!(record.is_valid());
    }

    #[test]
    fn show_state_round_trips_through_integers() {
        for state in [ShowState::Normal, ShowState::Minimized, ShowState::Maximized] {
            assert_eq!(ShowState::from_i64(state.as_i64()), state);
        }
        assert_eq!(ShowState::from_i64(42), ShowState::Normal);
    }
}
