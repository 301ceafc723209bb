pub mod caret;
pub mod easing;
pub mod inertia;
pub mod scroll;

pub use caret::CaretBlink;
pub use easing::EasingFunction;
pub use inertia::Inertia;
pub use scroll::ScrollAnimation;
