use crate::config::{TargetApp, Timing};
use crate::error::Result;
use crate::identity::find_display_index;
use crate::models::{DisplayRecord, ProcessStatus, Rect, SavedGeometry};
use crate::monitor::primary_usable_rect;
use crate::placement::{
    apply_placement, compute_target_rect, default_restore_rect, restore_original_placement,
    WindowControl,
};
use crate::settings::SelectionStore;

/// Everything the toggle needs from the desktop session.
pub trait Desktop {
    type Window: WindowControl;

    /// Prepare the accessibility client. Idempotent.
    fn ensure_accessibility(&self) -> Result<()>;
    fn probe_process(&self, target: &TargetApp) -> ProcessStatus;
    /// Top-level window matching the target's name and class, if any.
    fn find_target_window(&self, target: &TargetApp) -> Result<Option<Self::Window>>;
    fn displays(&self) -> Result<Vec<DisplayRecord>>;
}

/// Where the target app and its media window currently stand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleState {
    NotRunning,
    /// Only one process instance, so the second (media) window is not open.
    SingleWindowOnly,
    MediaWindowMissing,
    NotAtTarget,
    AtTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleAction {
    /// Window was moved onto the selected display.
    Displayed,
    /// Window was returned to where it was before.
    Restored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub ok: bool,
    pub message: String,
    pub action: Option<ToggleAction>,
}

impl ToggleOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            action: None,
        }
    }

    fn done(action: ToggleAction, target: &TargetApp) -> Self {
        let message = match action {
            ToggleAction::Displayed => format!("{} window moved to projector.", target.display_name),
            ToggleAction::Restored => format!("{} window restored.", target.display_name),
        };
        Self {
            ok: true,
            message,
            action: Some(action),
        }
    }
}

/// User-facing text for states in which there is nothing to toggle.
pub fn absence_message(state: ToggleState, target: &TargetApp) -> Option<String> {
    let name = target.display_name;
    match state {
        ToggleState::NotRunning => Some(format!("{name} is not running!")),
        ToggleState::SingleWindowOnly => Some(format!(
            "Could not find {name}'s second window. Please use {name} 'dual monitor' configuration"
        )),
        ToggleState::MediaWindowMissing => Some(format!("Could not find {name} media window!")),
        ToggleState::NotAtTarget | ToggleState::AtTarget => None,
    }
}

pub const NO_TARGET_DISPLAY: &str = "Could not find target monitor!";

/// Resolve the persisted selection against the current inventory.
pub fn resolve_target_rect(displays: &[DisplayRecord], store: &impl SelectionStore) -> Option<Rect> {
    find_display_index(displays, &store.selected_display_key(), store.legacy_rect())
        .map(|index| displays[index].monitor_rect)
}

enum Probe<W> {
    Absent(ToggleState),
    NoTargetDisplay,
    Found(Located<W>),
}

struct Located<W> {
    window: W,
    displays: Vec<DisplayRecord>,
    monitor_rect: Rect,
    current: Rect,
    target: Rect,
}

impl<W> Located<W> {
    fn state(&self) -> ToggleState {
        if self.current == self.target {
            ToggleState::AtTarget
        } else {
            ToggleState::NotAtTarget
        }
    }
}

/// Moves the target's media window between its own spot and the selected
/// display. Remembers where the window came from between calls.
pub struct ToggleController<D> {
    desktop: D,
    target: TargetApp,
    timing: Timing,
    saved: Option<SavedGeometry>,
}

impl<D: Desktop> ToggleController<D> {
    pub fn new(desktop: D, target: TargetApp, timing: Timing) -> Self {
        Self {
            desktop,
            target,
            timing,
            saved: None,
        }
    }

    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    pub fn target(&self) -> &TargetApp {
        &self.target
    }

    pub fn saved_geometry(&self) -> Option<SavedGeometry> {
        self.saved
    }

    /// Inspect without moving anything. `None` when no display is selected.
    pub fn state(&self, store: &impl SelectionStore) -> Result<Option<ToggleState>> {
        Ok(match self.probe(store)? {
            Probe::Absent(state) => Some(state),
            Probe::NoTargetDisplay => None,
            Probe::Found(located) => Some(located.state()),
        })
    }

    /// Show the window on the selected display, or put it back if it is
    /// already there.
    pub fn toggle(&mut self, store: &impl SelectionStore) -> ToggleOutcome {
        let outcome = match self.try_toggle(store) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("toggle failed: {e}");
                ToggleOutcome::failed(e.to_string())
            }
        };
        if outcome.ok {
            tracing::info!("{}", outcome.message);
        } else {
            tracing::warn!("{}", outcome.message);
        }
        outcome
    }

    fn try_toggle(&mut self, store: &impl SelectionStore) -> Result<ToggleOutcome> {
        let located = match self.probe(store)? {
            Probe::Absent(state) => {
                let message = absence_message(state, &self.target).unwrap_or_default();
                return Ok(ToggleOutcome::failed(message));
            }
            Probe::NoTargetDisplay => return Ok(ToggleOutcome::failed(NO_TARGET_DISPLAY)),
            Probe::Found(located) => located,
        };

        tracing::debug!(
            current = %located.current,
            target = %located.target,
            "media window located"
        );

        let action = match located.state() {
            ToggleState::AtTarget => {
                let saved = self.saved.unwrap_or_else(|| {
                    let primary = primary_usable_rect(&located.displays).unwrap_or(located.target);
                    SavedGeometry {
                        rect: default_restore_rect(primary),
                        was_minimized: false,
                    }
                });
                restore_original_placement(&located.window, &saved)?;
                ToggleAction::Restored
            }
            _ => {
                let was_minimized = located.window.is_minimized();
                let rect = if was_minimized {
                    located.window.normal_bounds()
                } else {
                    located.current
                };
                self.saved = Some(SavedGeometry { rect, was_minimized });
                let moved = apply_placement(&located.window, located.monitor_rect, &self.timing)?;
                tracing::debug!(target = %moved, "media window placed");
                ToggleAction::Displayed
            }
        };
        Ok(ToggleOutcome::done(action, &self.target))
    }

    fn probe(&self, store: &impl SelectionStore) -> Result<Probe<D::Window>> {
        self.desktop.ensure_accessibility()?;

        match self.desktop.probe_process(&self.target) {
            ProcessStatus::NotRunning => return Ok(Probe::Absent(ToggleState::NotRunning)),
            ProcessStatus::SingleWindowOnly => {
                return Ok(Probe::Absent(ToggleState::SingleWindowOnly));
            }
            ProcessStatus::Running => {}
        }

        let Some(window) = self.desktop.find_target_window(&self.target)? else {
            return Ok(Probe::Absent(ToggleState::MediaWindowMissing));
        };

        let displays = self.desktop.displays()?;
        let Some(monitor_rect) = resolve_target_rect(&displays, store) else {
            return Ok(Probe::NoTargetDisplay);
        };

        let current = window.bounds();
        let target = compute_target_rect(monitor_rect, window.frame_metrics());
        Ok(Probe::Found(Located {
            window,
            displays,
            monitor_rect,
            current,
            target,
        }))
    }
}
