//! Win32 implementations of the desktop seams.

mod automation;
mod focus;
pub mod instance;
mod monitors;
mod process;
mod window;

use windows::Win32::Foundation::RECT;

use crate::config::TargetApp;
use crate::error::Result;
use crate::models::{DisplayRecord, ProcessStatus, Rect};
use crate::monitor::DisplayInventory;
use crate::toggle::Desktop;

pub use automation::Automation;
pub use monitors::Win32DisplaySource;
pub use window::{Win32Window, read_placement, write_placement};

impl From<RECT> for Rect {
    fn from(r: RECT) -> Self {
        Rect::new(r.left, r.top, r.right, r.bottom)
    }
}

impl From<Rect> for RECT {
    fn from(r: Rect) -> Self {
        RECT {
            left: r.left,
            top: r.top,
            right: r.right,
            bottom: r.bottom,
        }
    }
}

/// UTF-16 buffer up to the first NUL.
pub(crate) fn wide_to_string(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

/// NUL-terminated UTF-16 copy of `s`.
pub(crate) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// The live desktop session: UI Automation, process table and displays.
pub struct Win32Desktop {
    automation: Automation,
    inventory: DisplayInventory<Win32DisplaySource>,
}

impl Win32Desktop {
    pub fn new() -> Self {
        Self {
            automation: Automation::new(),
            inventory: DisplayInventory::new(Win32DisplaySource),
        }
    }

    pub fn inventory(&self) -> &DisplayInventory<Win32DisplaySource> {
        &self.inventory
    }
}

impl Default for Win32Desktop {
    fn default() -> Self {
        Self::new()
    }
}

impl Desktop for Win32Desktop {
    type Window = Win32Window;

    fn ensure_accessibility(&self) -> Result<()> {
        self.automation.ensure_ready()
    }

    fn probe_process(&self, target: &TargetApp) -> ProcessStatus {
        ProcessStatus::from_count(process::count_processes(target.process_name))
    }

    fn find_target_window(&self, target: &TargetApp) -> Result<Option<Win32Window>> {
        self.automation.find_top_level(target.window_name, target.window_class)
    }

    fn displays(&self) -> Result<Vec<DisplayRecord>> {
        self.inventory.get_displays()
    }
}
