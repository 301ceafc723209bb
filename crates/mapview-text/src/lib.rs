//! mapview-text: line/run layout and soft-wrap rows for monospace text.
//!
//! - `unicode`: the fixed cluster consumption table
//! - `metrics`: cluster width measurement and its cache
//! - `layout`: runs, lines, column/index conversion and wrap tables
//!
//! Indices are UTF-16 code units relative to the line start, the unit
//! mapping columns are expressed in. Columns are display columns.

pub mod layout;
pub mod metrics;
pub mod unicode;

pub use layout::{
    LayoutOptions, LineRecord, LineView, Run, RunKind, Snapped, TextLayout, TieBreak, WrapCache,
    WrapTable, UNBOUNDED,
};
pub use metrics::{ClusterWidths, MonospaceMetrics, TextMetrics};
