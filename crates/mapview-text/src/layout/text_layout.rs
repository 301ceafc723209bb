use core::ops::Range;

use tracing::trace;

use super::hit_test::{self, Snapped, TieBreak};
use super::line::LineRecord;
use super::run::{Run, RunKind};
use crate::metrics::ClusterWidths;
use crate::unicode::cluster_end;

/// Default distance between tab stops, in columns.
pub const DEFAULT_TAB_WIDTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub tab_width: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

/// Lines and runs of one text buffer.
///
/// Built once per buffer; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    text: String,
    lines: Vec<LineRecord>,
    runs: Vec<Run>,
    max_columns: usize,
}

impl TextLayout {
    /// Split `text` on `\r\n`, `\r` and `\n` and classify every line into
    /// runs. Cluster widths are measured through `widths`.
    pub fn new(text: impl Into<String>, options: LayoutOptions, widths: &mut ClusterWidths) -> Self {
        let text = text.into();
        let tab_width = options.tab_width.max(1);
        let mut lines = Vec::new();
        let mut runs = Vec::new();
        let mut max_columns = 0usize;

        let bytes = text.as_bytes();
        let mut line_start = 0usize;
        let mut pos = 0usize;
        loop {
            let terminator_len = match bytes.get(pos) {
                None => 0,
                Some(b'\n') => 1,
                Some(b'\r') if bytes.get(pos + 1) == Some(&b'\n') => 2,
                Some(b'\r') => 1,
                Some(_) => {
                    pos += 1;
                    continue;
                }
            };

            let line = layout_line(
                &text[line_start..pos],
                line_start..pos,
                terminator_len,
                tab_width,
                widths,
                &mut runs,
            );
            max_columns = max_columns.max(line.end_column);
            lines.push(line);

            if terminator_len == 0 {
                break;
            }
            pos += terminator_len;
            line_start = pos;
        }

        trace!(
            lines = lines.len(),
            runs = runs.len(),
            max_columns,
            "text layout built"
        );

        Self {
            text,
            lines,
            runs,
            max_columns,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The run table shared by all lines.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Widest line, in columns.
    pub fn max_columns(&self) -> usize {
        self.max_columns
    }

    pub fn line(&self, index: usize) -> Option<LineView<'_>> {
        let record = self.lines.get(index)?;
        Some(LineView {
            index,
            record,
            runs: &self.runs[record.runs.clone()],
            text: &self.text[record.bytes.clone()],
        })
    }
}

/// Position reached while scanning one line.
#[derive(Default)]
struct LineCursor {
    byte: usize,
    index: usize,
    column: usize,
}

impl LineCursor {
    fn push(&mut self, runs: &mut Vec<Run>, kind: RunKind, byte_end: usize, units: usize, columns: usize) {
        runs.push(Run {
            kind,
            start_index: self.index,
            end_index: self.index + units,
            start_column: self.column,
            end_column: self.column + columns,
            bytes: self.byte..byte_end,
        });
        self.byte = byte_end;
        self.index += units;
        self.column += columns;
    }
}

fn layout_line(
    content: &str,
    bytes: Range<usize>,
    terminator_len: usize,
    tab_width: usize,
    widths: &mut ClusterWidths,
    runs: &mut Vec<Run>,
) -> LineRecord {
    let first_run = runs.len();
    let raw = content.as_bytes();
    let mut cursor = LineCursor::default();

    while cursor.byte < raw.len() {
        let byte = cursor.byte;
        match raw[byte] {
            b'\t' => {
                let next_stop = (cursor.column / tab_width + 1) * tab_width;
                let columns = next_stop - cursor.column;
                cursor.push(runs, RunKind::Tab, byte + 1, 1, columns);
            }
            b' ' => {
                let len = raw[byte..].iter().take_while(|&&b| b == b' ').count();
                cursor.push(runs, RunKind::Space, byte + len, len, len);
            }
            b'!'..=b'~' => {
                let len = raw[byte..]
                    .iter()
                    .take_while(|&&b| (b'!'..=b'~').contains(&b))
                    .count();
                cursor.push(runs, RunKind::Printable, byte + len, len, len);
            }
            _ => {
                let end = cluster_end(content, byte);
                let cluster = &content[byte..end];
                let units = cluster.encode_utf16().count();
                let columns = widths.columns(cluster);
                cursor.push(runs, RunKind::Cluster, end, units, columns);
            }
        }
    }

    let LineCursor {
        byte,
        index: end_index,
        column: end_column,
    } = cursor;
    if terminator_len > 0 {
        runs.push(Run {
            kind: RunKind::LineTerminator,
            start_index: end_index,
            end_index: end_index + terminator_len,
            start_column: end_column,
            end_column,
            bytes: byte..byte + terminator_len,
        });
    }

    LineRecord {
        bytes,
        runs: first_run..runs.len(),
        end_column,
        end_index,
        terminator_len,
    }
}

/// Borrowed view of one laid-out line.
#[derive(Debug, Clone, Copy)]
pub struct LineView<'a> {
    index: usize,
    record: &'a LineRecord,
    runs: &'a [Run],
    text: &'a str,
}

impl<'a> LineView<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn record(&self) -> &'a LineRecord {
        self.record
    }

    /// Runs of this line, terminator last.
    pub fn runs(&self) -> &'a [Run] {
        self.runs
    }

    /// Line content without the terminator.
    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn end_column(&self) -> usize {
        self.record.end_column
    }

    pub fn end_index(&self) -> usize {
        self.record.end_index
    }

    pub fn has_terminator(&self) -> bool {
        self.record.has_terminator()
    }

    /// Run covering `index`, if `index` is inside the line.
    pub fn run_at_index(&self, index: usize) -> Option<&'a Run> {
        let i = self.runs.partition_point(|run| run.end_index <= index);
        self.runs.get(i).filter(|run| run.start_index <= index)
    }

    /// Snap a fractional column to an index. See [`hit_test::column_to_index`].
    pub fn column_to_index(&self, column: f32, tie: TieBreak) -> Snapped {
        hit_test::column_to_index(self.runs, self.record, column, tie)
    }

    /// Column of an index. See [`hit_test::index_to_column`].
    pub fn index_to_column(&self, index: usize, tie: TieBreak) -> usize {
        hit_test::index_to_column(self.runs, self.record, index, tie)
    }
}
