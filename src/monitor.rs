use std::collections::HashMap;

use parking_lot::Mutex;

use crate::edid;
use crate::error::{Error, Result};
use crate::models::{DisplayRecord, Rect, RelativePosition};

pub const DEFAULT_DISPLAY_NAME_FORMAT: &str = "{FriendlyName} ({Position})";

/// Geometry reported by the monitor-enumeration pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonitorGeometry {
    pub monitor_rect: Rect,
    pub work_rect: Rect,
    pub is_primary: bool,
    pub device_name: String,
}

/// One active output path reported by the display-configuration pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayPath {
    pub id: u32,
    pub friendly_name: String,
    pub device_path: String,
}

/// Raw OS queries behind the display inventory.
pub trait DisplaySource {
    fn monitors(&self) -> Result<Vec<MonitorGeometry>>;

    /// Active output paths, in the same order as [`DisplaySource::monitors`].
    fn display_paths(&self) -> Result<Vec<DisplayPath>>;

    /// Raw EDID bytes for a device interface path, if any can be read.
    fn read_edid(&self, device_path: &str) -> Option<Vec<u8>>;
}

// ─── Serial cache ────────────────────────────────────────────────────────────

/// Per-device-path serial numbers. Misses are cached as empty strings so a
/// monitor without a readable EDID is not queried again.
#[derive(Default)]
pub struct SerialCache {
    entries: Mutex<HashMap<String, String>>,
}

impl SerialCache {
    pub fn get_or_insert_with(&self, device_path: &str, lookup: impl FnOnce() -> String) -> String {
        if let Some(serial) = self.entries.lock().get(device_path) {
            return serial.clone();
        }
        let serial = lookup();
        self.entries
            .lock()
            .insert(device_path.to_string(), serial.clone());
        serial
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }
}

// ─── Inventory ───────────────────────────────────────────────────────────────

/// Builds the ordered display list on demand, caching EDID serials for the
/// lifetime of the inventory.
pub struct DisplayInventory<S> {
    source: S,
    serials: SerialCache,
}

impl<S: DisplaySource> DisplayInventory<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            serials: SerialCache::default(),
        }
    }

    /// Enumerate every active display. Rebuilt from scratch on every call.
    pub fn get_displays(&self) -> Result<Vec<DisplayRecord>> {
        let monitors = self.source.monitors()?;
        let paths = self.source.display_paths()?;
        let displays = assemble_displays(monitors, paths, |device_path| {
            self.serial_for(device_path)
        })?;
        tracing::debug!(count = displays.len(), "display inventory refreshed");
        Ok(displays)
    }

    fn serial_for(&self, device_path: &str) -> String {
        if device_path.is_empty() {
            return String::new();
        }
        self.serials.get_or_insert_with(device_path, || {
            let serial = self
                .source
                .read_edid(device_path)
                .and_then(|bytes| edid::parse_serial(&bytes))
                .unwrap_or_default();
            if serial.is_empty() {
                tracing::debug!(device_path, "no EDID serial, using path identity");
            }
            serial
        })
    }

    pub fn cached_serials(&self) -> usize {
        self.serials.entry_count()
    }
}

/// Zip the two enumeration passes into display records and tag their
/// positions relative to the primary display.
pub fn assemble_displays(
    monitors: Vec<MonitorGeometry>,
    paths: Vec<DisplayPath>,
    mut serial_for: impl FnMut(&str) -> String,
) -> Result<Vec<DisplayRecord>> {
    if monitors.len() != paths.len() {
        return Err(Error::InventoryMismatch {
            monitors: monitors.len(),
            paths: paths.len(),
        });
    }

    let mut displays: Vec<DisplayRecord> = monitors
        .into_iter()
        .zip(paths)
        .map(|(monitor, path)| {
            let serial_number = serial_for(&path.device_path);
            let key = display_key(&serial_number, &path.device_path);
            DisplayRecord {
                id: path.id,
                is_primary: monitor.is_primary,
                monitor_rect: monitor.monitor_rect,
                work_rect: monitor.work_rect,
                friendly_name: path.friendly_name,
                device_path: path.device_path,
                device_name: monitor.device_name,
                serial_number,
                key,
                relative_position: RelativePosition::Overlap,
            }
        })
        .collect();

    let primary = primary_usable_rect(&displays);
    for display in &mut displays {
        display.relative_position = match (display.is_primary, primary) {
            (true, _) => RelativePosition::Primary,
            (false, Some(primary)) => describe_position(display.monitor_rect, primary),
            (false, None) => RelativePosition::Overlap,
        };
    }
    Ok(displays)
}

/// `SERIAL:<serial>` when a serial was recovered, otherwise `PATH:<device path>`.
pub fn display_key(serial_number: &str, device_path: &str) -> String {
    if serial_number.is_empty() {
        format!("PATH:{device_path}")
    } else {
        format!("SERIAL:{serial_number}")
    }
}

/// Usable area of the first primary display.
pub fn primary_usable_rect(displays: &[DisplayRecord]) -> Option<Rect> {
    displays
        .iter()
        .find(|d| d.is_primary)
        .map(DisplayRecord::usable_rect)
}

/// Classify `rect` against the primary display's usable area. The checks run
/// in a fixed order, so a rect that is both left of and above the primary
/// reports `left`.
pub const fn describe_position(rect: Rect, primary: Rect) -> RelativePosition {
    if rect.left == primary.left
        && rect.top == primary.top
        && rect.right == primary.right
        && rect.bottom == primary.bottom
    {
        RelativePosition::Primary
    } else if rect.right <= primary.left {
        RelativePosition::Left
    } else if rect.left >= primary.right {
        RelativePosition::Right
    } else if rect.bottom <= primary.top {
        RelativePosition::Above
    } else if rect.top >= primary.bottom {
        RelativePosition::Below
    } else {
        RelativePosition::Overlap
    }
}

// ─── Labels ──────────────────────────────────────────────────────────────────

/// Render a combo-box label. Supported placeholders: `{FriendlyName}`,
/// `{Position}`, `{SerialNumber}`, `{Key}`, `{DeviceName}`, `{Rect}`, `{Size}`.
pub fn display_name(display: &DisplayRecord, format: &str) -> String {
    let rect = display.monitor_rect;
    let mut label = format
        .replace("{FriendlyName}", &display.friendly_name)
        .replace("{Position}", display.relative_position.as_str())
        .replace("{SerialNumber}", &display.serial_number)
        .replace("{Key}", &display.key)
        .replace("{DeviceName}", &display.device_name)
        .replace("{Rect}", &rect.to_string())
        .replace("{Size}", &format!("{}x{}", rect.width(), rect.height()));

    // An empty value can leave a dangling bracket pair behind.
    for empty in [" ()", " []", " <>"] {
        label = label.replace(empty, "");
    }
    label.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use proptest::prelude::*;

    use super::*;

    fn monitor(rect: Rect, is_primary: bool, name: &str) -> MonitorGeometry {
        MonitorGeometry {
            monitor_rect: rect,
            work_rect: rect,
            is_primary,
            device_name: name.into(),
        }
    }

    fn path(id: u32, device_path: &str) -> DisplayPath {
        DisplayPath {
            id,
            friendly_name: format!("Monitor {id}"),
            device_path: device_path.into(),
        }
    }

    #[test]
    fn side_by_side_displays_are_tagged() {
        let displays = assemble_displays(
            vec![
                monitor(Rect::new(0, 0, 1920, 1080), true, r"\\.\DISPLAY1"),
                monitor(Rect::new(1920, 0, 3840, 1080), false, r"\\.\DISPLAY2"),
            ],
            vec![path(0, "p0"), path(1, "p1")],
            |_| String::new(),
        )
        .unwrap();

        assert_eq!(displays[0].relative_position, RelativePosition::Primary);
        assert_eq!(displays[1].relative_position, RelativePosition::Right);
        assert_eq!(displays[1].device_name, r"\\.\DISPLAY2");
        assert_eq!(displays[1].id, 1);
    }

    #[test]
    fn keys_prefer_serials() {
        let displays = assemble_displays(
            vec![
                monitor(Rect::new(0, 0, 1920, 1080), true, "a"),
                monitor(Rect::new(-1280, 0, 0, 1024), false, "b"),
            ],
            vec![path(3, "path-a"), path(4, "path-b")],
            |p| if p == "path-a" { "ABC123".into() } else { String::new() },
        )
        .unwrap();

        assert_eq!(displays[0].key, "SERIAL:ABC123");
        assert_eq!(displays[0].serial_number, "ABC123");
        assert_eq!(displays[1].key, "PATH:path-b");
        assert_eq!(displays[1].relative_position, RelativePosition::Left);
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let err = assemble_displays(
            vec![monitor(Rect::new(0, 0, 10, 10), true, "a")],
            vec![],
            |_| String::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InventoryMismatch {
                monitors: 1,
                paths: 0
            }
        ));
    }

    #[test]
    fn classification_uses_primary_work_area() {
        let mut primary = monitor(Rect::new(0, 0, 1920, 1080), true, "a");
        primary.work_rect = Rect::new(0, 0, 1920, 1040);
        let displays = assemble_displays(
            vec![
                primary,
                monitor(Rect::new(0, 1040, 1920, 2120), false, "b"),
                monitor(Rect::new(0, 1000, 1920, 2080), false, "c"),
            ],
            vec![path(0, "a"), path(1, "b"), path(2, "c")],
            |_| String::new(),
        )
        .unwrap();
        assert_eq!(displays[1].relative_position, RelativePosition::Below);
        assert_eq!(displays[2].relative_position, RelativePosition::Overlap);
    }

    #[test]
    fn describe_position_precedence() {
        let primary = Rect::new(0, 0, 1920, 1080);
        assert_eq!(describe_position(primary, primary), RelativePosition::Primary);
        assert_eq!(
            describe_position(Rect::new(-1920, -1080, 0, 0), primary),
            RelativePosition::Left
        );
        assert_eq!(
            describe_position(Rect::new(1920, 1080, 3840, 2160), primary),
            RelativePosition::Right
        );
        assert_eq!(
            describe_position(Rect::new(0, -1080, 1920, 0), primary),
            RelativePosition::Above
        );
        assert_eq!(
            describe_position(Rect::new(0, 1080, 1920, 2160), primary),
            RelativePosition::Below
        );
        assert_eq!(
            describe_position(Rect::new(100, 100, 800, 600), primary),
            RelativePosition::Overlap
        );
    }

    struct FakeSource {
        edid_reads: Cell<usize>,
    }

    impl DisplaySource for FakeSource {
        fn monitors(&self) -> Result<Vec<MonitorGeometry>> {
            Ok(vec![monitor(Rect::new(0, 0, 1920, 1080), true, "a")])
        }

        fn display_paths(&self) -> Result<Vec<DisplayPath>> {
            Ok(vec![path(0, "no-edid")])
        }

        fn read_edid(&self, _device_path: &str) -> Option<Vec<u8>> {
            self.edid_reads.set(self.edid_reads.get() + 1);
            None
        }
    }

    #[test]
    fn empty_serials_are_cached() {
        let inventory = DisplayInventory::new(FakeSource {
            edid_reads: Cell::new(0),
        });
        let first = inventory.get_displays().unwrap();
        let second = inventory.get_displays().unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].key, "PATH:no-edid");
        assert_eq!(inventory.source.edid_reads.get(), 1);
        assert_eq!(inventory.cached_serials(), 1);
    }

    #[test]
    fn serial_cache_counts_each_path_once() {
        let cache = SerialCache::default();
        assert_eq!(cache.entry_count(), 0);
        assert_eq!(cache.get_or_insert_with("a", || "S1".into()), "S1");
        assert_eq!(cache.get_or_insert_with("a", || unreachable!()), "S1");
        cache.get_or_insert_with("b", String::new);
        assert_eq!(cache.entry_count(), 2);
    }

    #[test]
    fn display_name_placeholders() {
        let display = DisplayRecord {
            friendly_name: "DELL U2720Q".into(),
            relative_position: RelativePosition::Right,
            monitor_rect: Rect::new(1920, 0, 5760, 2160),
            key: "SERIAL:ABC123".into(),
            ..Default::default()
        };
        assert_eq!(
            display_name(&display, DEFAULT_DISPLAY_NAME_FORMAT),
            "DELL U2720Q (right)"
        );
        assert_eq!(
            display_name(&display, "{FriendlyName} {Size} @ {Rect}"),
            "DELL U2720Q 3840x2160 @ 1920,0,5760,2160"
        );
        assert_eq!(
            display_name(&display, "{FriendlyName} [{SerialNumber}]"),
            "DELL U2720Q"
        );
    }

    proptest! {
        #[test]
        fn describe_position_is_primary_only_for_equal_rects(
            l in -4000i32..4000, t in -4000i32..4000, w in 1i32..4000, h in 1i32..4000,
        ) {
            let primary = Rect::new(0, 0, 1920, 1080);
            let rect = Rect::from_origin_size(l, t, w, h);
            let position = describe_position(rect, primary);
            prop_assert_eq!(position == RelativePosition::Primary, rect == primary);
        }

        #[test]
        fn disjoint_rects_never_overlap(
            l in -4000i32..4000, t in -4000i32..4000, w in 1i32..2000, h in 1i32..2000,
        ) {
            let primary = Rect::new(0, 0, 1920, 1080);
            let rect = Rect::from_origin_size(l, t, w, h);
            let disjoint = rect.right <= primary.left
                || rect.left >= primary.right
                || rect.bottom <= primary.top
                || rect.top >= primary.bottom;
            let position = describe_position(rect, primary);
            prop_assert_eq!(disjoint, position != RelativePosition::Overlap && position != RelativePosition::Primary);
        }
    }
}
