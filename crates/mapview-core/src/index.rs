//! Position indexes over decoded records.
//!
//! [`ForwardIndex`] keeps records in generated order and backs the generated
//! pane. Each loaded source owns an [`InverseIndex`] keyed by original
//! position; it is filled during load and sorted the first time anything
//! reads it.

use once_cell::unsync::OnceCell;

use crate::codec::DecodedMappings;
use crate::record::{KeyOrder, MappingRecord, Records, STRIDE};

/// Initial record capacity of an inverse index buffer.
const INVERSE_INITIAL_RECORDS: usize = 1024;

/// Records sorted by `(generated_line, generated_column)`.
#[derive(Debug, Clone, Default)]
pub struct ForwardIndex {
    data: Vec<i32>,
}

impl ForwardIndex {
    /// Take the decoder output and restore column order on the lines the
    /// decoder flagged. The sort is stable so duplicates keep stream order.
    pub fn from_decoded(decoded: DecodedMappings) -> Self {
        let DecodedMappings {
            mut data,
            unsorted_lines,
        } = decoded;
        for range in unsorted_lines {
            insertion_sort_by_column(&mut data, range.start, range.end);
        }
        Self { data }
    }

    pub fn records(&self) -> Records<'_> {
        Records::new(&self.data, KeyOrder::Generated)
    }

    pub fn len(&self) -> usize {
        self.data.len() / STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Stable insertion sort of records `start..end`, which share one line.
fn insertion_sort_by_column(data: &mut [i32], start: usize, end: usize) {
    for i in start + 1..end {
        let mut held = [0i32; STRIDE];
        held.copy_from_slice(&data[i * STRIDE..(i + 1) * STRIDE]);
        let column = held[1];

        let mut j = i;
        while j > start && data[(j - 1) * STRIDE + 1] > column {
            j -= 1;
        }
        if j == i {
            continue;
        }
        data.copy_within(j * STRIDE..i * STRIDE, (j + 1) * STRIDE);
        data[j * STRIDE..(j + 1) * STRIDE].copy_from_slice(&held);
    }
}

/// Records of one source in original-leading layout, sorted on first read.
#[derive(Debug, Default)]
pub struct InverseIndex {
    pending: Vec<i32>,
    sorted: OnceCell<Vec<i32>>,
}

impl InverseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Records are expected in generated order so that
    /// ties on the original position stay in generated order after sorting.
    pub fn push(&mut self, record: &MappingRecord) {
        if let Some(sorted) = self.sorted.take() {
            self.pending = sorted;
        }
        if self.pending.capacity() == 0 {
            self.pending.reserve_exact(INVERSE_INITIAL_RECORDS * STRIDE);
        } else if self.pending.len() + STRIDE > self.pending.capacity() {
            self.pending.reserve_exact(self.pending.capacity());
        }
        self.pending.extend_from_slice(&record.to_original_slots());
    }

    pub fn len(&self) -> usize {
        match self.sorted.get() {
            Some(sorted) => sorted.len() / STRIDE,
            None => self.pending.len() / STRIDE,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the sort has already run.
    pub fn is_sorted(&self) -> bool {
        self.sorted.get().is_some()
    }

    /// Sorted view; sorts on the first call.
    pub fn records(&self) -> Records<'_> {
        let sorted = self.sorted.get_or_init(|| {
            let mut data = self.pending.clone();
            merge_sort_records(&mut data);
            data
        });
        Records::new(sorted, KeyOrder::Original)
    }
}

/// Stable top-down merge sort of a flat buffer by its leading `(line, column)`.
///
/// Subranges that are already in order are left untouched, so sorting an
/// already sorted buffer does a single comparison per split.
pub fn merge_sort_records(data: &mut [i32]) {
    let len = data.len() / STRIDE;
    if len < 2 {
        return;
    }
    let mut scratch = vec![0i32; data.len()];
    sort_range(data, &mut scratch, 0, len);
}

#[inline]
fn key_at(data: &[i32], i: usize) -> (i32, i32) {
    (data[i * STRIDE], data[i * STRIDE + 1])
}

fn sort_range(data: &mut [i32], scratch: &mut [i32], lo: usize, hi: usize) {
    if hi - lo < 2 {
        return;
    }
    let mid = lo + (hi - lo) / 2;
    sort_range(data, scratch, lo, mid);
    sort_range(data, scratch, mid, hi);
    if key_at(data, mid - 1) <= key_at(data, mid) {
        return;
    }

    let (mut left, mut right, mut out) = (lo, mid, lo);
    while left < mid && right < hi {
        // `<=` keeps the left run first on ties.
        let take = if key_at(data, left) <= key_at(data, right) {
            let i = left;
            left += 1;
            i
        } else {
            let i = right;
            right += 1;
            i
        };
        scratch[out * STRIDE..(out + 1) * STRIDE]
            .copy_from_slice(&data[take * STRIDE..(take + 1) * STRIDE]);
        out += 1;
    }
    let rest = if left < mid { left..mid } else { right..hi };
    for take in rest {
        scratch[out * STRIDE..(out + 1) * STRIDE]
            .copy_from_slice(&data[take * STRIDE..(take + 1) * STRIDE]);
        out += 1;
    }
    data[lo * STRIDE..hi * STRIDE].copy_from_slice(&scratch[lo * STRIDE..hi * STRIDE]);
}
