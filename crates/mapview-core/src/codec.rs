//! Base64 VLQ decoding of the `mappings` string.
//!
//! The string is a sequence of line groups separated by `;`, each a sequence
//! of segments separated by `,`. A segment holds 1, 4 or 5 signed VLQ
//! values, each a delta against the previous value of the same field:
//! `[generated_column, (source, original_line, original_column, (name)?)?]`.
//! The generated column restarts at 0 on every `;`; the other totals carry
//! across lines.

use core::ops::Range;

use crate::error::{LoadError, MappingField, Result};
use crate::record::{ABSENT, MappingRecord, STRIDE};

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE_MASK: u32 = (1 << VLQ_BASE_SHIFT) - 1;
const VLQ_CONTINUATION_BIT: u32 = 1 << VLQ_BASE_SHIFT;
/// Largest shift a 32-bit value can need (7 digits).
const VLQ_MAX_SHIFT: u32 = 30;

/// Decoder output: records in stream order plus the lines whose generated
/// columns went backwards and still need a column re-sort.
#[derive(Debug, Clone, Default)]
pub struct DecodedMappings {
    /// Flat stride-6 buffer, generated position leading.
    pub data: Vec<i32>,
    /// Record ranges (not slot ranges), one per out-of-order line.
    pub unsorted_lines: Vec<Range<usize>>,
}

impl DecodedMappings {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.data.len() / STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn record(&self, i: usize) -> MappingRecord {
        MappingRecord::from_generated_slots(&self.data[i * STRIDE..(i + 1) * STRIDE])
    }
}

/// Running totals threaded through the decode loop.
#[derive(Debug, Default)]
struct DecoderState {
    generated_line: i32,
    generated_column: i32,
    source: i32,
    original_line: i32,
    original_column: i32,
    name: i32,
    /// First record of the current line group.
    line_start: usize,
    line_unsorted: bool,
}

impl DecoderState {
    fn finish_line(&mut self, out: &mut DecodedMappings) {
        let end = out.len();
        if self.line_unsorted && end - self.line_start > 1 {
            out.unsorted_lines.push(self.line_start..end);
        }
        self.line_unsorted = false;
        self.line_start = end;
    }

    fn next_line(&mut self, out: &mut DecodedMappings) {
        self.finish_line(out);
        self.generated_line += 1;
        self.generated_column = 0;
    }
}

/// Byte cursor over the mappings string.
struct Reader<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_segment_end(&self) -> bool {
        matches!(self.peek(), None | Some(b',') | Some(b';'))
    }

    /// Character offset of a byte position, for error reporting.
    fn offset(&self, byte_pos: usize) -> usize {
        match self.text.get(..byte_pos) {
            Some(prefix) => prefix.chars().count(),
            None => byte_pos,
        }
    }

    fn malformed(&self, byte_pos: usize, reason: &'static str) -> LoadError {
        LoadError::MalformedVlq {
            offset: self.offset(byte_pos),
            reason,
        }
    }

    fn read_vlq(&mut self) -> Result<i32> {
        let start = self.pos;
        let mut shift = 0u32;
        let mut value = 0u64;
        loop {
            let Some(byte) = self.peek() else {
                return Err(self.malformed(self.pos, "unexpected end of data inside a VLQ value"));
            };
            let Some(digit) = base64_value(byte) else {
                let reason = if matches!(byte, b',' | b';') {
                    "VLQ value truncated by a separator"
                } else {
                    "invalid base64 digit"
                };
                return Err(self.malformed(self.pos, reason));
            };
            self.pos += 1;
            value |= u64::from(digit & VLQ_BASE_MASK) << shift;
            if digit & VLQ_CONTINUATION_BIT == 0 {
                break;
            }
            shift += VLQ_BASE_SHIFT;
            if shift > VLQ_MAX_SHIFT {
                return Err(self.malformed(start, "VLQ value exceeds 32 bits"));
            }
        }

        // Zig-zag: the least significant bit carries the sign.
        let magnitude = i64::try_from(value >> 1)
            .ok()
            .filter(|m| *m <= i64::from(i32::MAX) + 1)
            .ok_or_else(|| self.malformed(start, "VLQ value exceeds 32 bits"))?;
        let signed = if value & 1 == 1 { -magnitude } else { magnitude };
        i32::try_from(signed).map_err(|_| self.malformed(start, "VLQ value exceeds 32 bits"))
    }

    /// Read a delta and apply it to `total`.
    fn read_delta(&mut self, total: &mut i32) -> Result<i32> {
        let start = self.pos;
        let delta = self.read_vlq()?;
        *total = total
            .checked_add(delta)
            .ok_or_else(|| self.malformed(start, "running total exceeds 32 bits"))?;
        Ok(delta)
    }
}

#[inline]
fn base64_value(byte: u8) -> Option<u32> {
    let value = match byte {
        b'A'..=b'Z' => byte - b'A',
        b'a'..=b'z' => byte - b'a' + 26,
        b'0'..=b'9' => byte - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return None,
    };
    Some(u32::from(value))
}

/// Decode a `mappings` string into flat records.
///
/// `source_count` and `name_count` bound the decoded source and name
/// indices. An empty source table disables its check and every segment
/// decodes as generated-only. Names are always checked, so a 5-field
/// segment needs a non-empty name table.
///
/// Lines whose generated columns go backwards are accepted and reported
/// in [`DecodedMappings::unsorted_lines`]; sorting them is the forward
/// index's job.
pub fn decode(mappings: &str, source_count: usize, name_count: usize) -> Result<DecodedMappings> {
    let mut reader = Reader::new(mappings);
    let mut state = DecoderState::default();
    let mut out = DecodedMappings {
        data: Vec::with_capacity(mappings.len() / 2),
        unsorted_lines: Vec::new(),
    };

    while let Some(byte) = reader.peek() {
        match byte {
            b';' => {
                reader.pos += 1;
                state.next_line(&mut out);
            }
            b',' => reader.pos += 1,
            _ => decode_segment(&mut reader, &mut state, &mut out, source_count, name_count)?,
        }
    }
    state.finish_line(&mut out);

    Ok(out)
}

fn decode_segment(
    reader: &mut Reader<'_>,
    state: &mut DecoderState,
    out: &mut DecodedMappings,
    source_count: usize,
    name_count: usize,
) -> Result<()> {
    let segment_start = reader.pos;
    let invalid = |reader: &Reader<'_>, field: MappingField, value: i32| LoadError::InvalidIndex {
        field,
        value: i64::from(value),
        offset: reader.offset(segment_start),
    };

    if reader.read_delta(&mut state.generated_column)? < 0 {
        state.line_unsorted = true;
    }
    if state.generated_column < 0 {
        return Err(invalid(&*reader, MappingField::GeneratedColumn, state.generated_column));
    }

    if reader.at_segment_end() {
        out.data.extend_from_slice(&[
            state.generated_line,
            state.generated_column,
            ABSENT,
            ABSENT,
            ABSENT,
            ABSENT,
        ]);
        return Ok(());
    }

    reader.read_delta(&mut state.source)?;
    if source_count > 0 && !index_in_bounds(state.source, source_count) {
        return Err(invalid(&*reader, MappingField::Source, state.source));
    }
    if reader.at_segment_end() {
        return Err(reader.malformed(reader.pos, "segment ends after 2 fields"));
    }

    reader.read_delta(&mut state.original_line)?;
    if state.original_line < 0 {
        return Err(invalid(&*reader, MappingField::OriginalLine, state.original_line));
    }
    if reader.at_segment_end() {
        return Err(reader.malformed(reader.pos, "segment ends after 3 fields"));
    }

    reader.read_delta(&mut state.original_column)?;
    if state.original_column < 0 {
        return Err(invalid(&*reader, MappingField::OriginalColumn, state.original_column));
    }

    let mut name = ABSENT;
    if !reader.at_segment_end() {
        reader.read_delta(&mut state.name)?;
        if !index_in_bounds(state.name, name_count) {
            return Err(invalid(&*reader, MappingField::Name, state.name));
        }
        name = state.name;
        if !reader.at_segment_end() {
            return Err(reader.malformed(reader.pos, "unexpected data after a 5-field segment"));
        }
    }

    if source_count == 0 {
        // Nothing to point into: keep the running totals, store the span
        // as generated-only.
        out.data.extend_from_slice(&[
            state.generated_line,
            state.generated_column,
            ABSENT,
            ABSENT,
            ABSENT,
            ABSENT,
        ]);
    } else {
        out.data.extend_from_slice(&[
            state.generated_line,
            state.generated_column,
            state.source,
            state.original_line,
            state.original_column,
            name,
        ]);
    }
    Ok(())
}

#[inline]
fn index_in_bounds(value: i32, count: usize) -> bool {
    usize::try_from(value).is_ok_and(|v| v < count)
}
