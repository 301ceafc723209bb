//! Greedy cluster consumption from a fixed table.
//!
//! This is not full UAX #29 segmentation. A cluster is one base character
//! plus any trailing extenders, where a zero width joiner also pulls in the
//! character after it and two regional indicators pair into one flag.

const ZWJ: char = '\u{200D}';

/// Code point ranges absorbed into the preceding cluster.
const EXTENDERS: &[(char, char)] = &[
    ('\u{0300}', '\u{036F}'),   // combining diacritical marks
    ('\u{0483}', '\u{0489}'),   // cyrillic combining marks
    ('\u{0591}', '\u{05BD}'),   // hebrew points
    ('\u{064B}', '\u{065F}'),   // arabic harakat
    ('\u{0E31}', '\u{0E31}'),   // thai
    ('\u{0E34}', '\u{0E3A}'),
    ('\u{0E47}', '\u{0E4E}'),
    ('\u{1AB0}', '\u{1AFF}'),   // combining diacritical marks extended
    ('\u{1DC0}', '\u{1DFF}'),   // combining diacritical marks supplement
    ('\u{20D0}', '\u{20FF}'),   // combining marks for symbols, keycap
    ('\u{FE00}', '\u{FE0F}'),   // variation selectors
    ('\u{FE20}', '\u{FE2F}'),   // combining half marks
    ('\u{1F3FB}', '\u{1F3FF}'), // skin tone modifiers
    ('\u{E0020}', '\u{E007F}'), // tags
    ('\u{E0100}', '\u{E01EF}'), // variation selectors supplement
];

#[inline]
fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

/// Whether `c` attaches to the cluster before it.
pub fn is_cluster_extender(c: char) -> bool {
    EXTENDERS
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&c))
}

/// Byte offset one past the cluster that starts at byte `start`.
///
/// `start` must be a char boundary. Returns `start` at end of text.
pub fn cluster_end(text: &str, start: usize) -> usize {
    let mut chars = text[start..].char_indices().peekable();
    let Some((_, base)) = chars.next() else {
        return start;
    };
    let mut end = start + base.len_utf8();

    if is_regional_indicator(base) {
        if let Some(&(offset, next)) = chars.peek() {
            if is_regional_indicator(next) {
                end = start + offset + next.len_utf8();
                chars.next();
            }
        }
    }

    while let Some(&(offset, c)) = chars.peek() {
        if c == ZWJ {
            chars.next();
            end = start + offset + c.len_utf8();
            if let Some((joined_offset, joined)) = chars.next() {
                end = start + joined_offset + joined.len_utf8();
            }
        } else if is_cluster_extender(c) {
            chars.next();
            end = start + offset + c.len_utf8();
        } else {
            break;
        }
    }
    end
}
