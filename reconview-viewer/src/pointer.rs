//! Click-versus-drag disambiguation

/// Pixel distance below which a press/release pair counts as a click
pub const DEFAULT_CLICK_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Remembers where the primary button went down.
///
/// Anything that moved `threshold` pixels or more before release was a camera
/// drag, not a pick.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickTracker {
    threshold_sq: f64,
    down: Option<(f64, f64)>,
}

impl ClickTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold_sq: threshold * threshold,
            down: None,
        }
    }

    pub fn pointer_down(&mut self, button: PointerButton, x: f64, y: f64) {
        if button == PointerButton::Primary {
            self.down = Some((x, y));
        }
    }

    /// Returns the release position when the gesture was a click
    pub fn pointer_up(&mut self, button: PointerButton, x: f64, y: f64) -> Option<(f64, f64)> {
        if button != PointerButton::Primary {
            return None;
        }
        let (x0, y0) = self.down.take()?;
        let (dx, dy) = (x - x0, y - y0);
        (dx * dx + dy * dy < self.threshold_sq).then_some((x, y))
    }
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_THRESHOLD)
    }
}
