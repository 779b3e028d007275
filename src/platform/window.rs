use std::ffi::c_void;
use std::mem::size_of;

use windows::Win32::Foundation::{COLORREF, HWND, RECT};
use windows::Win32::Graphics::Dwm::{DWMWA_CLOAK, DwmSetWindowAttribute};
use windows::Win32::UI::Accessibility::IUIAutomationElement;
use windows::Win32::UI::WindowsAndMessaging::{
    GWL_EXSTYLE, GetClientRect, GetWindowLongW, GetWindowPlacement, GetWindowRect, HWND_NOTOPMOST,
    HWND_TOPMOST, IsIconic, LWA_ALPHA, SW_RESTORE, SW_SHOWMINIMIZED, SWP_NOACTIVATE,
    SWP_NOCOPYBITS, SWP_NOMOVE, SWP_NOSENDCHANGING, SWP_NOSIZE, SWP_SHOWWINDOW,
    SetLayeredWindowAttributes, SetWindowLongW, SetWindowPlacement, SetWindowPos, ShowWindow,
    WINDOWPLACEMENT, WINDOWPLACEMENT_FLAGS, WS_EX_LAYERED,
};
use windows::core::BOOL;

use super::focus;
use crate::error::Result;
use crate::models::{FrameMetrics, Rect, ShowState, WindowPlacementRecord};
use crate::placement::{Layer, WindowControl};

pub(crate) const fn insert_after(layer: Layer) -> HWND {
    match layer {
        Layer::Topmost => HWND_TOPMOST,
        Layer::NotTopmost => HWND_NOTOPMOST,
    }
}

/// A located top-level window. Holds the automation element it was found
/// through so bounds come from the same source as the lookup.
pub struct Win32Window {
    hwnd: HWND,
    element: Option<IUIAutomationElement>,
}

impl Win32Window {
    pub fn new(hwnd: HWND, element: Option<IUIAutomationElement>) -> Self {
        Self { hwnd, element }
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    fn window_rect(&self) -> Option<Rect> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(self.hwnd, &mut rect) }
            .ok()
            .map(|_| rect.into())
    }

    fn placement(&self) -> Option<WINDOWPLACEMENT> {
        let mut placement = WINDOWPLACEMENT {
            length: size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        unsafe { GetWindowPlacement(self.hwnd, &mut placement) }
            .ok()
            .map(|_| placement)
    }
}

impl WindowControl for Win32Window {
    fn bounds(&self) -> Rect {
        let from_element = self
            .element
            .as_ref()
            .and_then(|e| unsafe { e.CurrentBoundingRectangle() }.ok());
        match from_element {
            Some(rect) => rect.into(),
            None => self.window_rect().unwrap_or_default(),
        }
    }

    fn normal_bounds(&self) -> Rect {
        match self.placement() {
            Some(p) => p.rcNormalPosition.into(),
            None => self.bounds(),
        }
    }

    fn frame_metrics(&self) -> Option<FrameMetrics> {
        let outer = self.window_rect()?;
        let mut client = RECT::default();
        unsafe { GetClientRect(self.hwnd, &mut client) }.ok()?;
        let client = Rect::from(client);
        if client.is_empty() {
            return None;
        }
        Some(FrameMetrics {
            outer_width: outer.width(),
            outer_height: outer.height(),
            client_width: client.width(),
            client_height: client.height(),
        })
    }

    fn is_minimized(&self) -> bool {
        unsafe { IsIconic(self.hwnd) }.as_bool()
    }

    fn restore(&self) {
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_RESTORE);
        }
    }

    fn set_cloaked(&self, cloaked: bool) -> bool {
        let value = BOOL::from(cloaked);
        let result = unsafe {
            DwmSetWindowAttribute(
                self.hwnd,
                DWMWA_CLOAK,
                &value as *const BOOL as *const c_void,
                size_of::<BOOL>() as u32,
            )
        };
        if let Err(e) = &result {
            tracing::debug!(cloaked, "DWMWA_CLOAK failed: {e}");
        }
        result.is_ok()
    }

    fn begin_fade(&self) -> bool {
        unsafe {
            let ex_style = GetWindowLongW(self.hwnd, GWL_EXSTYLE);
            let added = ex_style & WS_EX_LAYERED.0 as i32 == 0;
            if added {
                SetWindowLongW(self.hwnd, GWL_EXSTYLE, ex_style | WS_EX_LAYERED.0 as i32);
            }
            if let Err(e) = SetLayeredWindowAttributes(self.hwnd, COLORREF(0), 0, LWA_ALPHA) {
                tracing::debug!("could not make window transparent: {e}");
            }
            added
        }
    }

    fn set_opacity(&self, alpha: u8) {
        unsafe {
            let _ = SetLayeredWindowAttributes(self.hwnd, COLORREF(0), alpha, LWA_ALPHA);
        }
    }

    fn end_fade(&self, added_layered: bool) {
        if !added_layered {
            return;
        }
        unsafe {
            let ex_style = GetWindowLongW(self.hwnd, GWL_EXSTYLE);
            SetWindowLongW(self.hwnd, GWL_EXSTYLE, ex_style & !(WS_EX_LAYERED.0 as i32));
        }
    }

    fn move_to(&self, rect: Rect, layer: Layer) -> Result<()> {
        unsafe {
            SetWindowPos(
                self.hwnd,
                Some(insert_after(layer)),
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                SWP_NOCOPYBITS | SWP_NOSENDCHANGING | SWP_SHOWWINDOW,
            )?;
        }
        Ok(())
    }

    fn force_foreground(&self, layer: Layer) {
        focus::force_foreground(self.hwnd, layer);
    }

    fn minimize_with_restore_rect(&self, rect: Rect) -> Result<()> {
        unsafe {
            let _ = SetWindowPos(
                self.hwnd,
                Some(HWND_NOTOPMOST),
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
            );
        }
        let mut placement = self.placement().unwrap_or(WINDOWPLACEMENT {
            length: size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        });
        placement.flags = WINDOWPLACEMENT_FLAGS(0);
        placement.showCmd = SW_SHOWMINIMIZED.0 as u32;
        placement.rcNormalPosition = rect.into();
        unsafe { SetWindowPlacement(self.hwnd, &placement)? };
        Ok(())
    }
}

// ─── Control panel placement ─────────────────────────────────────────────────

/// Current placement of one of our own windows.
pub fn read_placement(hwnd: HWND) -> Option<WindowPlacementRecord> {
    let placement = Win32Window::new(hwnd, None).placement()?;
    Some(WindowPlacementRecord {
        normal_rect: placement.rcNormalPosition.into(),
        show_state: ShowState::from_i64(i64::from(placement.showCmd)),
    })
}

/// Move a window to a stored position, keeping its current size.
pub fn write_placement(hwnd: HWND, stored: WindowPlacementRecord) -> Result<()> {
    if !stored.is_valid() {
        return Ok(());
    }
    let window = Win32Window::new(hwnd, None);
    let Some(mut placement) = window.placement() else {
        return Ok(());
    };
    let current = Rect::from(placement.rcNormalPosition);
    placement.flags = WINDOWPLACEMENT_FLAGS(0);
    placement.showCmd = stored.show_state.as_i64() as u32;
    placement.rcNormalPosition = Rect::from_origin_size(
        stored.normal_rect.left,
        stored.normal_rect.top,
        current.width(),
        current.height(),
    )
    .into();
    unsafe { SetWindowPlacement(hwnd, &placement)? };
    Ok(())
}
