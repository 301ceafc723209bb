use core::ops::Range;

/// One logical line of a text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// Byte range of the line content in the buffer, terminator excluded.
    pub bytes: Range<usize>,
    /// Range into the layout's run table, terminator run included.
    pub runs: Range<usize>,
    /// Display columns covered by the content.
    pub end_column: usize,
    /// UTF-16 length of the content.
    pub end_index: usize,
    /// UTF-16 length of the terminator (0, 1 or 2).
    pub terminator_len: usize,
}

impl LineRecord {
    pub fn has_terminator(&self) -> bool {
        self.terminator_len > 0
    }

    /// UTF-16 length including the terminator.
    pub fn raw_len(&self) -> usize {
        self.end_index + self.terminator_len
    }

    pub fn is_empty(&self) -> bool {
        self.end_index == 0
    }
}
