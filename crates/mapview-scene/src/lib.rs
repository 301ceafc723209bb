//! mapview-scene: the interactive source map view.
//!
//! - `query`: pixel/position/mapping resolution over one pane
//! - `pane`: scroll state, geometry and scrollbars of one text pane
//! - `hover`: the shared hover state and its event stream
//! - `render`: paints a frame into a display list
//! - `view`: [`MapView`], the facade tying loading, input and frames together

pub mod animation;
pub mod events;
pub mod hover;
pub mod pane;
pub mod query;
pub mod redraw;
pub mod render;
pub mod style;
pub mod view;

pub use events::{Axis, EventResult, PointerEvent, WheelEvent};
pub use hover::{HoverEvent, HoverState, SubscriptionId};
pub use pane::{Pane, PaneId, PaneMetrics};
pub use query::{Hit, LineAnalysis, MappingRange, RowSpan};
pub use redraw::{RedrawQueue, RedrawReason};
pub use style::Theme;
pub use view::MapView;
