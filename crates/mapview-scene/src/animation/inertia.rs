//! Momentum left over after a pan gesture.
//!
//! Velocity is in pixels per frame and decays by a constant factor every
//! frame until it drops under the stop threshold.

/// Per-frame velocity decay (0.0 stops at once, 1.0 never slows down).
pub const FRICTION: f32 = 0.93;

/// Speed, in pixels per frame, below which the fling ends.
pub const STOP_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inertia {
    velocity: [f32; 2],
}

impl Inertia {
    /// Start a fling. `None` when `velocity` is too slow to move anything.
    pub fn new(velocity: [f32; 2]) -> Option<Self> {
        let fling = Self { velocity };
        (!fling.is_stopped()).then_some(fling)
    }

    pub fn velocity(&self) -> [f32; 2] {
        self.velocity
    }

    fn is_stopped(&self) -> bool {
        self.velocity[0].hypot(self.velocity[1]) < STOP_THRESHOLD
    }

    /// Decay one frame and return the scroll delta to apply, or `None` once
    /// the fling has run out.
    pub fn tick(&mut self) -> Option<[f32; 2]> {
        self.velocity = [self.velocity[0] * FRICTION, self.velocity[1] * FRICTION];
        if self.is_stopped() {
            self.velocity = [0.0, 0.0];
            return None;
        }
        Some(self.velocity)
    }
}
