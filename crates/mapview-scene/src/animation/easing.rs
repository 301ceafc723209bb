/// Maps linear progress in `0.0..=1.0` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EasingFunction {
    Linear,
    /// `4t³` for the first half, mirrored for the second.
    #[default]
    EaseInOutCubic,
}

impl EasingFunction {
    /// Evaluate at `t`, clamped to `0.0..=1.0`.
    pub fn evaluate(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOutCubic if t < 0.5 => 4.0 * t * t * t,
            Self::EaseInOutCubic => {
                let u = 2.0 - 2.0 * t;
                1.0 - u * u * u / 2.0
            }
        }
    }
}
