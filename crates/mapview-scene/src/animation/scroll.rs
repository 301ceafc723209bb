use std::time::{Duration, Instant};

use super::easing::EasingFunction;

/// Eased interpolation of a pane's scroll offsets toward a target.
///
/// The start time is stamped on the first tick, so an animation created
/// between frames begins at the next frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollAnimation {
    from: [f32; 2],
    to: [f32; 2],
    duration: Duration,
    easing: EasingFunction,
    started: Option<Instant>,
}

impl ScrollAnimation {
    pub fn new(from: [f32; 2], to: [f32; 2], duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            easing: EasingFunction::EaseInOutCubic,
            started: None,
        }
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    pub fn target(&self) -> [f32; 2] {
        self.to
    }

    /// Offsets at `now` and whether the animation has finished.
    pub fn tick(&mut self, now: Instant) -> ([f32; 2], bool) {
        let started = *self.started.get_or_insert(now);
        if self.duration.is_zero() {
            return (self.to, true);
        }
        let elapsed = now.saturating_duration_since(started);
        let t = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0);
        if t >= 1.0 {
            return (self.to, true);
        }
        let k = self.easing.evaluate(t);
        let lerp = |a: f32, b: f32| a + (b - a) * k;
        ([lerp(self.from[0], self.to[0]), lerp(self.from[1], self.to[1])], false)
    }
}
