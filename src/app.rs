use crate::config::AppConfig;
use crate::identity::find_display_index;
use crate::models::DisplayRecord;
use crate::monitor::display_name;
use crate::settings::SelectionStore;
use crate::toggle::{Desktop, ToggleController, ToggleOutcome};

// ─── Application State ───────────────────────────────────────────────────────

/// State behind the control panel: the display list, the current selection,
/// the toggle controller and the status line.
pub struct ControlPanel<D, S> {
    pub displays: Vec<DisplayRecord>,
    pub selected: Option<usize>,
    pub status: String,
    name_format: String,
    store: S,
    controller: ToggleController<D>,
}

impl<D: Desktop, S: SelectionStore> ControlPanel<D, S> {
    pub fn new(config: AppConfig, desktop: D, store: S, name_format: Option<String>) -> Self {
        let mut panel = Self {
            displays: vec![],
            selected: None,
            status: String::from("Ready."),
            name_format: name_format.unwrap_or(config.display_name_format),
            store,
            controller: ToggleController::new(desktop, config.target, config.timing),
        };
        panel.refresh_displays();
        panel
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn controller(&self) -> &ToggleController<D> {
        &self.controller
    }

    /// Re-read the inventory and re-apply the persisted selection.
    pub fn refresh_displays(&mut self) {
        match self.controller.desktop().displays() {
            Ok(displays) => self.displays = displays,
            Err(e) => {
                tracing::error!("display enumeration failed: {e}");
                self.displays.clear();
                self.selected = None;
                self.status = format!("❌ {e}");
                return;
            }
        }

        self.selected = find_display_index(
            &self.displays,
            &self.store.selected_display_key(),
            self.store.legacy_rect(),
        );
        tracing::debug!(count = self.displays.len(), selected = ?self.selected, "displays loaded");
    }

    pub fn display_labels(&self) -> Vec<String> {
        self.displays
            .iter()
            .map(|d| display_name(d, &self.name_format))
            .collect()
    }

    pub fn selected_label(&self) -> Option<String> {
        self.selected
            .and_then(|i| self.displays.get(i))
            .map(|d| display_name(d, &self.name_format))
    }

    /// Remember `index` as the projector display.
    pub fn select_display(&mut self, index: usize) {
        let Some(display) = self.displays.get(index) else {
            return;
        };
        self.selected = Some(index);

        let key = display.key.clone();
        let rect = display.monitor_rect;
        let saved = self
            .store
            .set_selected_display_key(&key)
            .and_then(|()| self.store.set_legacy_rect(rect));
        match saved {
            Ok(()) => tracing::info!(key, "projector display selected"),
            Err(e) => {
                tracing::warn!("could not save selection: {e}");
                self.status = format!("⚠ Selection not saved: {e}");
            }
        }
    }

    pub fn can_toggle(&self) -> bool {
        self.selected.is_some()
    }

    pub fn toggle(&mut self) -> ToggleOutcome {
        let outcome = self.controller.toggle(&self.store);
        let icon = if outcome.ok { '✅' } else { '❌' };
        self.status = format!("{icon} {}", outcome.message);
        outcome
    }
}
