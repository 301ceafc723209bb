//! Flat mapping records and the shared point-query primitive.

/// Number of `i32` slots per record in every flat mapping buffer.
pub const STRIDE: usize = 6;

/// Sentinel stored in the source and name slots when the field is absent.
pub const ABSENT: i32 = -1;

/// One decoded association between a generated position and an optional
/// original position and name.
///
/// A record with `source_index == ABSENT` is a generated-only span: its
/// original line and column are also `ABSENT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappingRecord {
    pub generated_line: i32,
    pub generated_column: i32,
    pub source_index: i32,
    pub original_line: i32,
    pub original_column: i32,
    pub name_index: i32,
}

impl MappingRecord {
    /// Read a record stored with the generated position leading.
    pub fn from_generated_slots(slots: &[i32]) -> Self {
        Self {
            generated_line: slots[0],
            generated_column: slots[1],
            source_index: slots[2],
            original_line: slots[3],
            original_column: slots[4],
            name_index: slots[5],
        }
    }

    /// Read a record stored with the original position leading
    /// (`[original_line, original_column, source, generated_line, generated_column, name]`).
    pub fn from_original_slots(slots: &[i32]) -> Self {
        Self {
            original_line: slots[0],
            original_column: slots[1],
            source_index: slots[2],
            generated_line: slots[3],
            generated_column: slots[4],
            name_index: slots[5],
        }
    }

    pub fn to_generated_slots(&self) -> [i32; STRIDE] {
        [
            self.generated_line,
            self.generated_column,
            self.source_index,
            self.original_line,
            self.original_column,
            self.name_index,
        ]
    }

    pub fn to_original_slots(&self) -> [i32; STRIDE] {
        [
            self.original_line,
            self.original_column,
            self.source_index,
            self.generated_line,
            self.generated_column,
            self.name_index,
        ]
    }

    /// Whether the record carries an original position.
    pub fn has_original(&self) -> bool {
        self.source_index != ABSENT
    }

    pub fn source(&self) -> Option<usize> {
        usize::try_from(self.source_index).ok()
    }

    pub fn name(&self) -> Option<usize> {
        usize::try_from(self.name_index).ok()
    }
}

/// Slot layout of a flat buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrder {
    /// `[generated_line, generated_column, ...]`
    Generated,
    /// `[original_line, original_column, ...]`
    Original,
}

/// Read-only view over a sorted flat record buffer.
///
/// Slot 0 is the line and slot 1 the column of whichever position leads, so
/// the same search code serves the generated pane and every original pane.
#[derive(Debug, Clone, Copy)]
pub struct Records<'a> {
    data: &'a [i32],
    order: KeyOrder,
}

impl<'a> Records<'a> {
    pub fn new(data: &'a [i32], order: KeyOrder) -> Self {
        debug_assert_eq!(data.len() % STRIDE, 0);
        Self { data, order }
    }

    pub fn len(&self) -> usize {
        self.data.len() / STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn order(&self) -> KeyOrder {
        self.order
    }

    /// The underlying flat buffer.
    pub fn as_slice(&self) -> &'a [i32] {
        self.data
    }

    /// Leading line of record `i`.
    #[inline]
    pub fn line(&self, i: usize) -> i32 {
        self.data[i * STRIDE]
    }

    /// Leading column of record `i`.
    #[inline]
    pub fn column(&self, i: usize) -> i32 {
        self.data[i * STRIDE + 1]
    }

    #[inline]
    pub fn key(&self, i: usize) -> (i32, i32) {
        (self.line(i), self.column(i))
    }

    pub fn slots(&self, i: usize) -> &'a [i32] {
        &self.data[i * STRIDE..(i + 1) * STRIDE]
    }

    /// Record `i` in canonical field order.
    pub fn record(&self, i: usize) -> MappingRecord {
        match self.order {
            KeyOrder::Generated => MappingRecord::from_generated_slots(self.slots(i)),
            KeyOrder::Original => MappingRecord::from_original_slots(self.slots(i)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = MappingRecord> + 'a {
        let order = self.order;
        self.data.chunks_exact(STRIDE).map(move |slots| match order {
            KeyOrder::Generated => MappingRecord::from_generated_slots(slots),
            KeyOrder::Original => MappingRecord::from_original_slots(slots),
        })
    }

    /// Index of the first record on `line`, or of the first record after it.
    pub fn first_on_line(&self, line: i32) -> usize {
        self.partition_point(|key| key.0 < line)
    }

    /// Index of the first record a query at `(line, column)` has to look at.
    ///
    /// Finds the first record past the target, steps back onto the last
    /// record at or before the target when that record is on the same line,
    /// then rewinds to the first record of its tie group so every record
    /// sharing that position is visible to the caller. When nothing on
    /// `line` precedes the target the result is the first record after it
    /// (possibly `len()`).
    pub fn first_mapping_at_or_after(&self, line: i32, column: i32) -> usize {
        let target = (line, column);
        let mut first = self.partition_point(|key| key <= target);
        if first > 0 && self.line(first - 1) == line {
            first -= 1;
        }
        while first > 0 && first < self.len() && self.key(first - 1) == self.key(first) {
            first -= 1;
        }
        first
    }

    /// Last record at or before `(line, column)` on `line`; the last of any
    /// duplicates wins.
    pub fn lookup(&self, line: i32, column: i32) -> Option<usize> {
        let mut found = None;
        let mut i = self.first_mapping_at_or_after(line, column);
        while i < self.len() && self.line(i) == line && self.column(i) <= column {
            found = Some(i);
            i += 1;
        }
        found
    }

    fn partition_point(&self, pred: impl Fn((i32, i32)) -> bool) -> usize {
        let (mut lo, mut hi) = (0usize, self.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(self.key(mid)) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }
}
