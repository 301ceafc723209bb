//! mapview-surface: the drawing capability.
//!
//! Views never draw directly. They record commands through a [`Painter`]
//! into a [`DisplayList`] that the host replays on whatever 2D backend it
//! owns.

pub mod color;
pub mod display_list;
pub mod painter;
pub mod scene;

pub use display_list::{Command, DisplayList, Viewport};
pub use painter::Painter;
pub use scene::{
    Brush, ClipRect, Color, ColorLinPremul, FillRule, Path, PathCmd, Rect, RoundedRadii,
    RoundedRect, Stroke, TextRun, Transform2D,
};
