use std::time::{Duration, Instant};

use crate::config::Timing;
use crate::error::Result;
use crate::models::{FrameMetrics, Rect, SavedGeometry};

// Fixed frame allowance used when a window's metrics cannot be read.
const LEGACY_BORDER: i32 = 8;
const LEGACY_TITLE_BAR: i32 = 54;

// Fallback restore geometry when the window was never moved this session.
const DEFAULT_RESTORE_OFFSET: i32 = 50;
const DEFAULT_RESTORE_WIDTH: i32 = 1280;
const DEFAULT_RESTORE_HEIGHT: i32 = 720;

/// Z-order band a window should end up in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Topmost,
    NotTopmost,
}

/// Operations the placement engine needs on a live window.
///
/// Methods without a `Result` are cosmetic: implementations swallow and log
/// their failures.
pub trait WindowControl {
    /// Current bounding rectangle in screen coordinates.
    fn bounds(&self) -> Rect;
    /// Geometry the window returns to when un-minimized.
    fn normal_bounds(&self) -> Rect;
    fn frame_metrics(&self) -> Option<FrameMetrics>;
    fn is_minimized(&self) -> bool;
    fn restore(&self);

    /// Hide from the compositor without changing visibility state.
    fn set_cloaked(&self, cloaked: bool) -> bool;
    /// Make the window layered at opacity 0. Returns whether the layered
    /// style had to be added.
    fn begin_fade(&self) -> bool;
    fn set_opacity(&self, alpha: u8);
    /// Undo [`WindowControl::begin_fade`], dropping the layered style if it was added.
    fn end_fade(&self, added_layered: bool);

    fn move_to(&self, rect: Rect, layer: Layer) -> Result<()>;
    /// Bring to the foreground even when another process owns focus.
    fn force_foreground(&self, layer: Layer);
    /// Write `rect` as the restore geometry and minimize.
    fn minimize_with_restore_rect(&self, rect: Rect) -> Result<()>;
}

// ─── Geometry ────────────────────────────────────────────────────────────────

/// Rectangle that makes the window's client area fill `monitor_rect`.
///
/// The frame is inflated by half the difference between outer and client
/// size on each axis. Without metrics, fixed title-bar and border
/// allowances are used.
pub const fn compute_target_rect(monitor_rect: Rect, frame: Option<FrameMetrics>) -> Rect {
    match frame {
        Some(f) => monitor_rect.inflate(
            (f.outer_width - f.client_width) / 2,
            (f.outer_height - f.client_height) / 2,
        ),
        None => Rect::new(
            monitor_rect.left - LEGACY_BORDER,
            monitor_rect.top - LEGACY_TITLE_BAR,
            monitor_rect.right + LEGACY_BORDER,
            monitor_rect.bottom + LEGACY_BORDER * 2,
        ),
    }
}

/// Somewhere sensible on the primary display for a window we never moved.
pub fn default_restore_rect(primary_usable: Rect) -> Rect {
    let width = DEFAULT_RESTORE_WIDTH
        .min(primary_usable.width() - DEFAULT_RESTORE_OFFSET * 2)
        .max(1);
    let height = DEFAULT_RESTORE_HEIGHT
        .min(primary_usable.height() - DEFAULT_RESTORE_OFFSET * 2)
        .max(1);
    Rect::from_origin_size(
        primary_usable.left + DEFAULT_RESTORE_OFFSET,
        primary_usable.top + DEFAULT_RESTORE_OFFSET,
        width,
        height,
    )
}

/// Opacity at `elapsed` into a linear fade-in lasting `total`.
pub fn fade_alpha(elapsed: Duration, total: Duration) -> u8 {
    if total.is_zero() || elapsed >= total {
        return u8::MAX;
    }
    let alpha = u128::from(u8::MAX) * elapsed.as_micros() / total.as_micros();
    alpha.min(u128::from(u8::MAX)) as u8
}

// ─── Moving the window ───────────────────────────────────────────────────────

/// Cloaks and fades a window for the duration of a move. Dropping it always
/// leaves the window uncloaked, opaque and with its original styles.
struct Concealed<'a, W: WindowControl> {
    window: &'a W,
    cloaked: bool,
    added_layered: Option<bool>,
}

impl<'a, W: WindowControl> Concealed<'a, W> {
    fn begin(window: &'a W) -> Self {
        let cloaked = window.set_cloaked(true);
        if !cloaked {
            tracing::debug!("cloak unavailable, relying on opacity only");
        }
        let added_layered = Some(window.begin_fade());
        Self {
            window,
            cloaked,
            added_layered,
        }
    }

    fn reveal(&mut self) {
        if self.cloaked {
            self.window.set_cloaked(false);
            self.cloaked = false;
        }
    }

    fn fade_in(&mut self, timing: &Timing) {
        let start = Instant::now();
        loop {
            let alpha = fade_alpha(start.elapsed(), timing.fade_duration);
            self.window.set_opacity(alpha);
            if alpha == u8::MAX {
                break;
            }
            std::thread::sleep(timing.fade_frame);
        }
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(added) = self.added_layered.take() {
            self.window.set_opacity(u8::MAX);
            self.window.end_fade(added);
        }
    }
}

impl<W: WindowControl> Drop for Concealed<'_, W> {
    fn drop(&mut self) {
        self.reveal();
        self.finish();
    }
}

/// Poll until the window leaves the minimized state or the timeout passes.
fn wait_until_restored<W: WindowControl>(window: &W, timing: &Timing) -> bool {
    let deadline = Instant::now() + timing.restore_timeout;
    while window.is_minimized() {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(timing.restore_poll);
    }
    true
}

/// Move the window so its client area fills `monitor_rect`, topmost and
/// focused, without showing any intermediate frames. Returns the rectangle
/// the window was moved to.
///
/// A minimized window reports no usable frame metrics, so the target is
/// computed only after it has been restored.
pub fn apply_placement<W: WindowControl>(
    window: &W,
    monitor_rect: Rect,
    timing: &Timing,
) -> Result<Rect> {
    if window.is_minimized() {
        window.restore();
        if !wait_until_restored(window, timing) {
            tracing::warn!("window still minimized after {:?}", timing.restore_timeout);
        }
    }
    let target = compute_target_rect(monitor_rect, window.frame_metrics());

    let mut concealed = Concealed::begin(window);
    window.move_to(target, Layer::Topmost)?;
    concealed.reveal();
    window.force_foreground(Layer::Topmost);
    concealed.fade_in(timing);
    Ok(target)
}

/// Put the window back where [`apply_placement`] found it.
pub fn restore_original_placement<W: WindowControl>(window: &W, saved: &SavedGeometry) -> Result<()> {
    if saved.was_minimized {
        window.minimize_with_restore_rect(saved.rect)
    } else {
        window.force_foreground(Layer::NotTopmost);
        window.move_to(saved.rect, Layer::NotTopmost)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use proptest::prelude::*;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
        minimized_polls: Cell<u32>,
        bounds: Cell<Rect>,
        restored: Cell<bool>,
        frame_after_restore: Cell<Option<FrameMetrics>>,
    }

    impl Recorder {
        fn log(&self, call: impl Into<String>) {
            self.calls.borrow_mut().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl WindowControl for Recorder {
        fn bounds(&self) -> Rect {
            self.bounds.get()
        }
        fn normal_bounds(&self) -> Rect {
            self.bounds.get()
        }
        fn frame_metrics(&self) -> Option<FrameMetrics> {
            if self.restored.get() {
                self.frame_after_restore.get()
            } else {
                None
            }
        }
        fn is_minimized(&self) -> bool {
            let left = self.minimized_polls.get();
            if left > 0 {
                self.minimized_polls.set(left - 1);
            }
            left > 0
        }
        fn restore(&self) {
            self.restored.set(true);
            self.log("restore");
        }
        fn set_cloaked(&self, cloaked: bool) -> bool {
            self.log(format!("cloak:{cloaked}"));
            true
        }
        fn begin_fade(&self) -> bool {
            self.log("begin_fade");
            true
        }
        fn set_opacity(&self, _alpha: u8) {}
        fn end_fade(&self, added_layered: bool) {
            self.log(format!("end_fade:{added_layered}"));
        }
        fn move_to(&self, rect: Rect, layer: Layer) -> Result<()> {
            self.bounds.set(rect);
            self.log(format!("move:{rect}:{layer:?}"));
            Ok(())
        }
        fn force_foreground(&self, layer: Layer) {
            self.log(format!("foreground:{layer:?}"));
        }
        fn minimize_with_restore_rect(&self, rect: Rect) -> Result<()> {
            self.log(format!("minimize:{rect}"));
            Ok(())
        }
    }

    #[test]
    fn target_rect_uses_half_the_frame_difference() {
        let frame = FrameMetrics {
            outer_width: 1296,
            outer_height: 759,
            client_width: 1280,
            client_height: 720,
        };
        let target = compute_target_rect(Rect::new(1920, 0, 3840, 1080), Some(frame));
        assert_eq!(target, Rect::new(1912, -19, 3848, 1099));
    }

    #[test]
    fn target_rect_legacy_allowances() {
        let target = compute_target_rect(Rect::new(1920, 0, 3840, 1080), None);
        assert_eq!(target, Rect::new(1912, -54, 3848, 1096));
        assert_eq!(target.width(), 1920 + 16);
        assert_eq!(target.height(), 1080 + 54 + 16);
    }

    #[test]
    fn default_restore_rect_sits_inside_primary() {
        let rect = default_restore_rect(Rect::new(0, 0, 1920, 1040));
        assert_eq!(rect, Rect::new(50, 50, 1330, 770));

        let small = default_restore_rect(Rect::new(-1024, 0, 0, 768));
        assert_eq!(small, Rect::new(-974, 50, -50, 718));
    }

    #[test]
    fn fade_is_linear_and_ends_opaque() {
        let total = Duration::from_millis(300);
        assert_eq!(fade_alpha(Duration::ZERO, total), 0);
        assert_eq!(fade_alpha(Duration::from_millis(150), total), 127);
        assert_eq!(fade_alpha(total, total), 255);
        assert_eq!(fade_alpha(Duration::from_secs(5), total), 255);
        assert_eq!(fade_alpha(Duration::ZERO, Duration::ZERO), 255);
    }

    #[test]
    fn apply_moves_while_cloaked_then_focuses() {
        let window = Recorder::default();
        let target = Rect::new(1912, -54, 3848, 1096);
        let monitor = Rect::new(1920, 0, 3840, 1080);
        let moved = apply_placement(&window, monitor, &Timing::immediate()).unwrap();
        assert_eq!(moved, target);
        assert_eq!(
            window.calls(),
            vec![
                "cloak:true".to_string(),
                "begin_fade".into(),
                format!("move:{target}:Topmost"),
                "cloak:false".into(),
                "foreground:Topmost".into(),
                "end_fade:true".into(),
            ]
        );
        assert_eq!(window.bounds(), target);
    }

    #[test]
    fn apply_restores_minimized_window_first() {
        let window = Recorder::default();
        window.minimized_polls.set(3);
        apply_placement(&window, Rect::new(0, 0, 10, 10), &Timing::immediate()).unwrap();
        assert_eq!(window.calls()[0], "restore");
    }

    #[test]
    fn target_uses_frame_metrics_read_after_restore() {
        let window = Recorder::default();
        window.minimized_polls.set(1);
        window.frame_after_restore.set(Some(FrameMetrics {
            outer_width: 1296,
            outer_height: 759,
            client_width: 1280,
            client_height: 720,
        }));
        let monitor = Rect::new(1920, 0, 3840, 1080);
        let moved = apply_placement(&window, monitor, &Timing::immediate()).unwrap();
        assert_eq!(moved, Rect::new(1912, -19, 3848, 1099));
        assert_eq!(window.bounds(), moved);
    }

    #[test]
    fn restore_for_minimized_window_reminimizes() {
        let window = Recorder::default();
        let saved = SavedGeometry {
            rect: Rect::new(100, 100, 900, 700),
            was_minimized: true,
        };
        restore_original_placement(&window, &saved).unwrap();
        assert_eq!(window.calls(), vec!["minimize:100,100,900,700".to_string()]);
    }

    #[test]
    fn restore_for_normal_window_moves_back_without_fade() {
        let window = Recorder::default();
        let saved = SavedGeometry {
            rect: Rect::new(100, 100, 900, 700),
            was_minimized: false,
        };
        restore_original_placement(&window, &saved).unwrap();
        assert_eq!(
            window.calls(),
            vec![
                "foreground:NotTopmost".to_string(),
                "move:100,100,900,700:NotTopmost".into(),
            ]
        );
    }

    proptest! {
        #[test]
        fn target_rect_is_deterministic(
            l in -5000i32..5000, t in -5000i32..5000, w in 1i32..8000, h in 1i32..8000,
            bx in 0i32..40, by in 0i32..80,
        ) {
            let monitor = Rect::from_origin_size(l, t, w, h);
            let frame = FrameMetrics {
                outer_width: 800 + bx,
                outer_height: 600 + by,
                client_width: 800,
                client_height: 600,
            };
            let first = compute_target_rect(monitor, Some(frame));
            prop_assert_eq!(first, compute_target_rect(monitor, Some(frame)));
            prop_assert_eq!(first.left, monitor.left - bx / 2);
            prop_assert_eq!(first.bottom, monitor.bottom + by / 2);
        }

        #[test]
        fn fade_never_decreases(a in 0u64..400, b in 0u64..400) {
            let total = Duration::from_millis(300);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(fade_alpha(Duration::from_millis(lo), total) <= fade_alpha(Duration::from_millis(hi), total));
        }
    }
}
