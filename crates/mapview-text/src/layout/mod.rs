pub mod line;
pub mod run;
pub mod text_layout;
pub mod wrap;

pub use hit_test::{Snapped, TieBreak};
pub use line::LineRecord;
pub use run::{Run, RunKind};
pub use text_layout::{LayoutOptions, LineView, TextLayout, DEFAULT_TAB_WIDTH};
pub use wrap::{columns_across, rows_for_columns, WrapCache, WrapTable, UNBOUNDED};
