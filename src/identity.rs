use crate::models::{DisplayRecord, Rect};

/// Map a persisted display selection back to an index in the current inventory.
///
/// The stable key is compared case-insensitively and the first match wins.
/// Selections saved before keys existed only carry the monitor rectangle, so
/// when the key is empty or unknown the first display whose rectangle is
/// bit-exactly equal to `legacy_rect` is used instead.
pub fn find_display_index(displays: &[DisplayRecord], key: &str, legacy_rect: Rect) -> Option<usize> {
    if !key.is_empty() {
        if let Some(index) = displays
            .iter()
            .position(|d| d.key.eq_ignore_ascii_case(key))
        {
            return Some(index);
        }
    }

    if legacy_rect.width() <= 0 {
        return None;
    }
    displays.iter().position(|d| d.monitor_rect == legacy_rect)
}
