use windows::Win32::Foundation::HWND;
use windows::Win32::System::Threading::{AttachThreadInput, GetCurrentThreadId};
use windows::Win32::UI::WindowsAndMessaging::{
    BringWindowToTop, GetForegroundWindow, GetWindowThreadProcessId, SWP_NOMOVE, SWP_NOSIZE,
    SWP_SHOWWINDOW, SetForegroundWindow, SetWindowPos,
};

use super::window::insert_after;
use crate::placement::Layer;

/// Shares our input queue with another thread until dropped.
struct InputAttachment {
    current: u32,
    target: u32,
    attached: bool,
}

impl InputAttachment {
    fn attach(target: u32) -> Self {
        let current = unsafe { GetCurrentThreadId() };
        let attached = target != 0
            && target != current
            && unsafe { AttachThreadInput(current, target, true) }.as_bool();
        Self {
            current,
            target,
            attached,
        }
    }
}

impl Drop for InputAttachment {
    fn drop(&mut self) {
        if self.attached {
            unsafe {
                let _ = AttachThreadInput(self.current, self.target, false);
            }
        }
    }
}

/// Bring `hwnd` to the foreground and into `layer`, even when another
/// process currently owns focus.
pub fn force_foreground(hwnd: HWND, layer: Layer) {
    unsafe {
        let foreground = GetForegroundWindow();
        let foreground_thread = if foreground.is_invalid() {
            0
        } else {
            GetWindowThreadProcessId(foreground, None)
        };
        let window_thread = GetWindowThreadProcessId(hwnd, None);
        let _to_foreground = InputAttachment::attach(foreground_thread);
        let _to_window = if window_thread == foreground_thread {
            None
        } else {
            Some(InputAttachment::attach(window_thread))
        };

        let _ = BringWindowToTop(hwnd);
        if let Err(e) = SetWindowPos(
            hwnd,
            Some(insert_after(layer)),
            0,
            0,
            0,
            0,
            SWP_NOMOVE | SWP_NOSIZE | SWP_SHOWWINDOW,
        ) {
            tracing::debug!("z-order change failed: {e}");
        }
        if !SetForegroundWindow(hwnd).as_bool() {
            tracing::debug!("SetForegroundWindow refused");
        }
    }
}
