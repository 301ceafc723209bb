use core::ops::Range;

/// Classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKind {
    /// One `\t`, advancing to the next tab stop.
    Tab,
    /// `\n`, `\r\n` or `\r`. Zero columns wide, always last on its line.
    LineTerminator,
    /// One cluster outside printable ASCII.
    Cluster,
    /// Consecutive spaces.
    Space,
    /// Consecutive printable ASCII (`!` through `~`).
    Printable,
}

impl RunKind {
    /// Atomic runs only expose their two edges.
    pub fn is_atomic(self) -> bool {
        matches!(self, Self::Tab | Self::LineTerminator | Self::Cluster)
    }

    pub fn is_whitespace(self) -> bool {
        matches!(self, Self::Tab | Self::Space | Self::LineTerminator)
    }
}

/// A classified token inside one line.
///
/// Indices are UTF-16 code units and `bytes` is a byte range, both relative
/// to the start of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub kind: RunKind,
    pub start_index: usize,
    pub end_index: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub bytes: Range<usize>,
}

impl Run {
    pub fn is_atomic(&self) -> bool {
        self.kind.is_atomic()
    }

    pub fn columns(&self) -> usize {
        self.end_column - self.start_column
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    pub fn contains_index(&self, index: usize) -> bool {
        (self.start_index..self.end_index).contains(&index)
    }
}
