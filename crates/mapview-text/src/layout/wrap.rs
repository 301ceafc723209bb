//! Logical line to visual row mapping under soft wrap.

use std::rc::Rc;

use hashbrown::HashMap;
use tracing::debug;

use super::text_layout::TextLayout;

/// Column budget meaning "no wrapping".
pub const UNBOUNDED: usize = usize::MAX;

/// Columns that fit across `available_width` pixels, or [`UNBOUNDED`] when
/// wrapping is off.
pub fn columns_across(available_width: f32, column_width: f32, wrap_enabled: bool) -> usize {
    if !wrap_enabled || column_width <= 0.0 {
        return UNBOUNDED;
    }
    (available_width / column_width).floor().max(1.0) as usize
}

/// Rows a line of `line_columns` columns occupies. Empty lines take one row.
pub fn rows_for_columns(line_columns: usize, columns_across: usize) -> usize {
    if columns_across == UNBOUNDED || columns_across == 0 {
        return 1;
    }
    line_columns.div_ceil(columns_across).max(1)
}

/// Prefix sums of visual rows: `rows[i]` is the number of rows taken by
/// lines `0..i`, so `rows[line_count]` is the total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapTable {
    columns_across: usize,
    rows: Vec<usize>,
}

impl WrapTable {
    pub fn new(layout: &TextLayout, columns_across: usize) -> Self {
        let mut rows = Vec::with_capacity(layout.line_count() + 1);
        let mut total = 0usize;
        rows.push(total);
        for line in layout.lines() {
            total += rows_for_columns(line.end_column, columns_across);
            rows.push(total);
        }
        Self {
            columns_across,
            rows,
        }
    }

    pub fn columns_across(&self) -> usize {
        self.columns_across
    }

    /// Number of real lines.
    pub fn line_count(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn total_rows(&self) -> usize {
        self.rows[self.rows.len() - 1]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.rows
    }

    /// First row of `line`. Lines past the end take one phantom row each.
    pub fn row_for_line(&self, line: usize) -> usize {
        match self.rows.get(line) {
            Some(&row) => row,
            None => self.total_rows() + (line - self.line_count()),
        }
    }

    /// Line shown on `row`.
    pub fn line_index_for_row(&self, row: usize) -> usize {
        let total = self.total_rows();
        if row >= total {
            return self.line_count() + (row - total);
        }
        self.rows.partition_point(|&start| start <= row) - 1
    }

    /// Column at which `row` starts within its line.
    pub fn first_column_of_row(&self, row: usize) -> usize {
        if self.columns_across == UNBOUNDED {
            return 0;
        }
        let line = self.line_index_for_row(row);
        (row - self.row_for_line(line)) * self.columns_across
    }

    /// Rows `line` occupies.
    pub fn rows_in_line(&self, line: usize) -> usize {
        self.row_for_line(line + 1) - self.row_for_line(line)
    }
}

/// One [`WrapTable`] per column budget ever requested for a layout.
#[derive(Debug, Default)]
pub struct WrapCache {
    tables: HashMap<usize, Rc<WrapTable>>,
}

impl WrapCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, layout: &TextLayout, columns_across: usize) -> Rc<WrapTable> {
        let table = self.tables.entry(columns_across).or_insert_with(|| {
            debug!(columns_across, lines = layout.line_count(), "building wrap table");
            Rc::new(WrapTable::new(layout, columns_across))
        });
        Rc::clone(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Drop every table; the layout they were built from changed.
    pub fn clear(&mut self) {
        self.tables.clear();
    }
}
