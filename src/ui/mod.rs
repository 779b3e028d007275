pub mod panels;

use eframe::egui;
use windows::Win32::Foundation::HWND;

use crate::app::ControlPanel;
use crate::platform::instance::SingleInstance;
use crate::platform::{Win32Desktop, read_placement, write_placement};
use crate::settings::{SelectionStore, SettingsStore};

pub const WINDOW_TITLE: &str = "Projector Switch";

// ─── eframe App ──────────────────────────────────────────────────────────────

pub struct ProjectorApp {
    pub panel: ControlPanel<Win32Desktop, SettingsStore>,
    placement_restored: bool,
    _instance: SingleInstance,
}

impl ProjectorApp {
    pub fn new(panel: ControlPanel<Win32Desktop, SettingsStore>, instance: SingleInstance) -> Self {
        Self {
            panel,
            placement_restored: false,
            _instance: instance,
        }
    }

    /// Move the panel to where it was last closed. Runs once the native
    /// window exists.
    fn restore_own_placement(&mut self) {
        self.placement_restored = true;
        let Some(hwnd) = own_hwnd() else {
            return;
        };
        let stored = self.panel.store().window_placement();
        if let Err(e) = write_placement(hwnd, stored) {
            tracing::warn!("could not restore window placement: {e}");
        }
    }

    fn save_own_placement(&mut self) {
        let Some(placement) = own_hwnd().and_then(read_placement) else {
            return;
        };
        if let Err(e) = self.panel.store_mut().set_window_placement(placement) {
            tracing::warn!("could not save window placement: {e}");
        }
    }
}

impl eframe::App for ProjectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.placement_restored {
            self.restore_own_placement();
        }

        let close_requested = ctx.input(|i| i.viewport().close_requested());
        if close_requested {
            self.save_own_placement();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            panels::draw_display_picker(self, ui);
            ui.add_space(8.0);

            if panels::draw_toggle_button(self, ui) {
                // Moving the media window topmost can bury the panel.
                ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(
                    egui::WindowLevel::AlwaysOnTop,
                ));
            }

            ui.add_space(8.0);
            panels::draw_status_bar(self, ui);
        });
    }
}

/// Native handle of the panel window, found by title.
fn own_hwnd() -> Option<HWND> {
    use windows::Win32::UI::WindowsAndMessaging::FindWindowW;
    use windows::core::PCWSTR;
    let title = title_wide();
    unsafe {
        match FindWindowW(None, PCWSTR(title.as_ptr())) {
            Ok(hwnd) if !hwnd.0.is_null() => Some(hwnd),
            _ => None,
        }
    }
}

fn title_wide() -> Vec<u16> {
    crate::platform::to_wide(WINDOW_TITLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::wide_to_string;

    #[test]
    fn lookup_title_matches_viewport_title() {
        let title = title_wide();
        assert_eq!(title.last(), Some(&0));
        assert_eq!(wide_to_string(&title), WINDOW_TITLE);
    }
}
