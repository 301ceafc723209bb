use std::time::{Duration, Instant};

/// Caret blink phase.
///
/// The view calls `update` every frame with whether a caret is currently
/// shown; the return value says whether visibility flipped and the frame
/// needs repainting.
#[derive(Clone, Copy, Debug)]
pub struct CaretBlink {
    pub visible: bool,
    interval: Duration,
    phase_start: Option<Instant>,
    active: bool,
}

impl CaretBlink {
    pub fn new(interval: Duration) -> Self {
        Self {
            visible: true,
            interval,
            phase_start: None,
            active: false,
        }
    }

    pub fn update(&mut self, now: Instant, active: bool) -> bool {
        if active != self.active {
            // Caret appeared or went away: restart the phase visible.
            self.active = active;
            self.visible = true;
            self.phase_start = Some(now);
            return false;
        }
        if !active || self.interval.is_zero() {
            return false;
        }

        let start = *self.phase_start.get_or_insert(now);
        if now.saturating_duration_since(start) >= self.interval {
            self.visible = !self.visible;
            self.phase_start = Some(now);
            return true;
        }
        false
    }

    /// Show the caret and restart the phase (after the caret moved). The
    /// new phase starts at the next `update`.
    pub fn reset(&mut self) {
        self.visible = true;
        self.phase_start = None;
    }
}

impl Default for CaretBlink {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blinks_on_interval() {
        let mut caret = CaretBlink::new(Duration::from_millis(500));
        let t0 = Instant::now();
        assert!(!caret.update(t0, true));
        assert!(caret.visible);
        assert!(!caret.update(t0 + Duration::from_millis(499), true));
        assert!(caret.update(t0 + Duration::from_millis(500), true));
        assert!(!caret.visible);
        assert!(caret.update(t0 + Duration::from_millis(1000), true));
        assert!(caret.visible);
    }

    #[test]
    fn test_inactive_caret_never_toggles() {
        let mut caret = CaretBlink::default();
        let t0 = Instant::now();
        assert!(!caret.update(t0, false));
        assert!(!caret.update(t0 + Duration::from_secs(5), false));
    }

    #[test]
    fn test_reset_shows_caret() {
        let mut caret = CaretBlink::new(Duration::from_millis(500));
        let t0 = Instant::now();
        caret.update(t0, true);
        caret.update(t0 + Duration::from_millis(600), true);
        assert!(!caret.visible);
        caret.reset();
        assert!(caret.visible);

        // The phase restarts from the first update after the reset.
        let t1 = t0 + Duration::from_millis(2000);
        assert!(!caret.update(t1, true));
        assert!(caret.visible);
        assert!(!caret.update(t1 + Duration::from_millis(499), true));
        assert!(caret.update(t1 + Duration::from_millis(500), true));
    }
}
