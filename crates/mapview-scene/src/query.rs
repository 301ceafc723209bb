//! Position queries between pixels, text positions and mapping records.
//!
//! Everything here works on one pane's layout, wrap table and record view
//! and returns `None` for positions nothing answers to. Pointer events are
//! frequent and best-effort, so nothing in this module fails.

use mapview_core::Records;
use mapview_text::layout::hit_test;
use mapview_text::{LineRecord, Run, Snapped, TextLayout, TieBreak, WrapTable, UNBOUNDED};

/// Index range a mapping covers on its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingRange {
    pub start_index: usize,
    pub end_index: usize,
    pub start_column: usize,
    /// Always past `start_column`, so zero-width ranges stay visible.
    pub end_column: usize,
    /// No distinct mapping follows on the line.
    pub is_last: bool,
    /// The mapping points past the end of its line (or past the text).
    pub out_of_bounds: bool,
}

impl MappingRange {
    /// Half-open membership; a zero-width last range contains its start.
    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..self.end_index).contains(&index)
            || (self.is_last && index == self.start_index)
    }

    pub fn columns(&self) -> usize {
        self.end_column - self.start_column
    }
}

/// One line resolved against a target column.
#[derive(Debug, Clone)]
pub struct LineAnalysis<'a> {
    line: usize,
    runs: &'a [Run],
    bounds: LineRecord,
    phantom: bool,
    records: Records<'a>,
    /// The target, snapped per the requested tie-break.
    pub snapped: Snapped,
    /// First record a query at `snapped` has to look at.
    pub first_mapping: usize,
}

/// Resolve `column` on `line` and locate the records around it.
///
/// Lines past the end of the text resolve as empty lines so mappings that
/// point there stay addressable.
pub fn analyze_line<'a>(
    layout: &'a TextLayout,
    records: Records<'a>,
    line: usize,
    column: f32,
    tie: TieBreak,
) -> LineAnalysis<'a> {
    let (runs, bounds, phantom) = match layout.line(line) {
        Some(view) => (view.runs(), view.record().clone(), false),
        None => (&[][..], phantom_line(), true),
    };
    let snapped = hit_test::column_to_index(runs, &bounds, column, tie);
    let first_mapping = records.first_mapping_at_or_after(line_key(line), index_key(snapped.index));
    LineAnalysis {
        line,
        runs,
        bounds,
        phantom,
        records,
        snapped,
        first_mapping,
    }
}

fn phantom_line() -> LineRecord {
    LineRecord {
        bytes: 0..0,
        runs: 0..0,
        end_column: 0,
        end_index: 0,
        terminator_len: 0,
    }
}

fn line_key(line: usize) -> i32 {
    i32::try_from(line).unwrap_or(i32::MAX)
}

fn index_key(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

impl<'a> LineAnalysis<'a> {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn is_phantom(&self) -> bool {
        self.phantom
    }

    pub fn bounds(&self) -> &LineRecord {
        &self.bounds
    }

    pub fn records(&self) -> Records<'a> {
        self.records
    }

    pub fn column_to_index(&self, column: f32, tie: TieBreak) -> Snapped {
        hit_test::column_to_index(self.runs, &self.bounds, column, tie)
    }

    pub fn index_to_column(&self, index: usize, tie: TieBreak) -> usize {
        hit_test::index_to_column(self.runs, &self.bounds, index, tie)
    }

    /// Record covering `index` on this line; the last of any duplicates
    /// wins.
    pub fn mapping_at(&self, index: usize) -> Option<usize> {
        self.records.lookup(line_key(self.line), index_key(index))
    }

    /// Record indices starting on this line, one per distinct position (the
    /// last of each group of duplicates).
    pub fn mappings_on_line(&self) -> impl Iterator<Item = usize> + '_ {
        let line = line_key(self.line);
        let records = self.records;
        let start = records.first_on_line(line);
        (start..records.len())
            .take_while(move |&i| records.line(i) == line)
            .filter(move |&i| i + 1 >= records.len() || records.key(i + 1) != records.key(i))
    }

    /// Range record `record` covers on this line: up to the next record
    /// starting at a different position, or to the end of the line when it
    /// is the last one.
    pub fn range_of_mapping(&self, record: usize) -> Option<MappingRange> {
        let line = line_key(self.line);
        if record >= self.records.len() || self.records.line(record) != line {
            return None;
        }
        let start = usize::try_from(self.records.column(record)).ok()?;

        let mut next = record + 1;
        while next < self.records.len() && self.records.key(next) == self.records.key(record) {
            next += 1;
        }
        let following = (next < self.records.len() && self.records.line(next) == line)
            .then(|| usize::try_from(self.records.column(next)).ok())
            .flatten();
        let (end, is_last) = match following {
            Some(end) => (end, false),
            None => (self.bounds.end_index.max(start), true),
        };

        let start_column = self.index_to_column(start, TieBreak::Floor);
        let end_column = self
            .index_to_column(end, TieBreak::Floor)
            .max(start_column + 1);
        Some(MappingRange {
            start_index: start,
            end_index: end,
            start_column,
            end_column,
            is_last,
            out_of_bounds: self.phantom || start > self.bounds.end_index,
        })
    }
}

/// Result of resolving a row and fractional column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub line: usize,
    pub row: usize,
    /// Nearest edge, for the caret.
    pub caret: Snapped,
    /// Start edge, for containment.
    pub index: usize,
    /// Record under the position and the range it covers.
    pub mapping: Option<(usize, MappingRange)>,
}

/// Forward query: `row` and fractional `column` (absolute within the line)
/// to a text position and the mapping containing it.
///
/// Returns `None` for rows below the last line of text.
pub fn hit_test(
    layout: &TextLayout,
    wrap: &WrapTable,
    records: Records<'_>,
    row: usize,
    column: f32,
) -> Option<Hit> {
    let line = wrap.line_index_for_row(row);
    if line >= layout.line_count() {
        return None;
    }
    let window_start = wrap.first_column_of_row(row);
    let across = wrap.columns_across();
    let window_end = if across == UNBOUNDED {
        UNBOUNDED
    } else {
        window_start.saturating_add(across)
    };

    // Leftover pixels past a wrapped row's last column stay on that row;
    // only the line's last row extends into phantom columns.
    let last_row = wrap.row_for_line(line) + wrap.rows_in_line(line).saturating_sub(1);
    let column = if across != UNBOUNDED && row < last_row {
        column.min(window_end as f32 - 0.5)
    } else {
        column
    };

    let caret = analyze_line(layout, records, line, column, TieBreak::Round).snapped;
    let floor = analyze_line(layout, records, line, column, TieBreak::Floor);
    let index = floor.snapped.index;

    let mapping = floor.mapping_at(index).and_then(|record| {
        let range = floor.range_of_mapping(record)?;
        let overlaps = range.start_column < window_end && range.end_column > window_start;
        (range.contains(index) && overlaps).then_some((record, range))
    });

    Some(Hit {
        line,
        row,
        caret,
        index,
        mapping,
    })
}

/// Columns `start_column..end_column` of a line, restricted to one visual
/// row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub row: usize,
    pub start_column: usize,
    pub end_column: usize,
}

/// Split a column range of `line` into per-row pieces under `wrap`.
///
/// Columns past the line's last row stay on that row, so phantom positions
/// past the end of a line extend it rather than spilling into the next.
pub fn row_spans(wrap: &WrapTable, line: usize, start_column: usize, end_column: usize) -> Vec<RowSpan> {
    let first_row = wrap.row_for_line(line);
    let across = wrap.columns_across();
    if across == UNBOUNDED || start_column >= end_column {
        return vec![RowSpan {
            row: first_row,
            start_column,
            end_column,
        }];
    }

    let last_offset = wrap.rows_in_line(line).saturating_sub(1);
    let mut spans = Vec::new();
    let mut column = start_column;
    while column < end_column {
        let offset = (column / across).min(last_offset);
        let row_end = if offset == last_offset {
            end_column
        } else {
            ((offset + 1) * across).min(end_column)
        };
        spans.push(RowSpan {
            row: first_row + offset,
            start_column: column,
            end_column: row_end,
        });
        column = row_end;
    }
    spans
}
