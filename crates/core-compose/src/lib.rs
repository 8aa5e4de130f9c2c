//! Character composition pre-pass.
//!
//! Merges combining sequences (base + combining marks) into composed
//! characters before contraction matching, while keeping an index map back to
//! original offsets so cursor positions and offset maps stay correct through
//! the transformation. This is deliberately a composition step only, not full
//! normalization: no reordering, no compatibility mappings.

use unicode_normalization::char::{compose, decompose_canonical};

/// Result of composing an input slice.
///
/// `index_map[i]` is the original-input start offset of composed position
/// `i`; the final entry is a sentinel equal to the original length, so the
/// map always has `text.len() + 1` entries and every composed position owns
/// the original range `index_map[i]..index_map[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub text: Vec<char>,
    pub index_map: Vec<usize>,
}

/// Canonically compose an input character sequence.
///
/// Pairwise composition: each character is folded into the preceding one when
/// the two have a canonical composition (e.g. `e` + U+0301 → `é`). Sequences
/// with no composition pass through unchanged.
pub fn compose_characters(input: &[char]) -> Composition {
    let mut text = Vec::with_capacity(input.len());
    let mut index_map = Vec::with_capacity(input.len() + 1);
    let mut iter = input.iter().copied().enumerate();
    if let Some((_, first)) = iter.next() {
        let mut current = first;
        let mut start = 0usize;
        for (i, c) in iter {
            if let Some(combined) = compose(current, c) {
                current = combined;
            } else {
                text.push(current);
                index_map.push(start);
                current = c;
                start = i;
            }
        }
        text.push(current);
        index_map.push(start);
    }
    index_map.push(input.len());
    Composition { text, index_map }
}

impl Composition {
    /// True when composition changed nothing; callers may then translate the
    /// original input directly.
    pub fn is_identity(&self) -> bool {
        // Composition only ever merges, so equal lengths mean nothing changed.
        self.text.len() == self.original_len()
    }

    /// Number of composed characters.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Original length of the input this composition came from.
    pub fn original_len(&self) -> usize {
        *self.index_map.last().unwrap_or(&0)
    }

    /// Re-express an original-input cursor offset in composed-index space.
    ///
    /// Last match wins: the cursor maps to the latest composed position whose
    /// original range starts at or before the offset. In particular, when the
    /// offset lands exactly on a group boundary the cursor belongs to the
    /// *later* composed glyph. An offset at or past the end maps one past the
    /// last composed position.
    pub fn cursor_to_composed(&self, original: usize) -> usize {
        if original >= self.original_len() {
            return self.len();
        }
        // partition_point over the non-sentinel entries; the map is sorted.
        let upto = self.index_map[..self.len()].partition_point(|&s| s <= original);
        upto.saturating_sub(1)
    }

    /// Re-express a composed-index cursor back in original-input space.
    /// Maps to the start of the composed position's original range.
    pub fn cursor_to_original(&self, composed: usize) -> usize {
        let clamped = composed.min(self.len());
        self.index_map[clamped]
    }
}

/// Strip combining marks from a character: its canonical decomposition's base
/// character, or the character itself when it has none. Feeds the engine's
/// undefined-dots fallback chain (`é` renders as `e` when the table defines
/// no dots for `é`).
pub fn base_character(c: char) -> char {
    let mut base = None;
    decompose_canonical(c, |d| {
        if base.is_none() {
            base = Some(d);
        }
    });
    base.unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn empty_input() {
        let c = compose_characters(&[]);
        assert!(c.text.is_empty());
        assert_eq!(c.index_map, vec![0]);
        assert!(c.is_identity());
        assert_eq!(c.cursor_to_composed(0), 0);
    }

    #[test]
    fn ascii_passes_through() {
        let input = chars("abc");
        let c = compose_characters(&input);
        assert_eq!(c.text, input);
        assert_eq!(c.index_map, vec![0, 1, 2, 3]);
        assert!(c.is_identity());
    }

    #[test]
    fn combining_acute_composes() {
        // 'e' + U+0301 -> 'é'; 'x' follows to exercise the post-group offset.
        let input = vec!['e', '\u{0301}', 'x'];
        let c = compose_characters(&input);
        assert_eq!(c.text, vec!['é', 'x']);
        assert_eq!(c.index_map, vec![0, 2, 3]);
        assert!(!c.is_identity());
    }

    #[test]
    fn cursor_mapping_last_match_wins() {
        let input = vec!['e', '\u{0301}', 'x'];
        let c = compose_characters(&input);
        // Inside the composed group.
        assert_eq!(c.cursor_to_composed(0), 0);
        assert_eq!(c.cursor_to_composed(1), 0);
        // Exactly on the boundary: the later glyph owns it.
        assert_eq!(c.cursor_to_composed(2), 1);
        // At or past the end.
        assert_eq!(c.cursor_to_composed(3), 2);
        assert_eq!(c.cursor_to_composed(99), 2);
    }

    #[test]
    fn cursor_back_to_original_is_group_start() {
        let input = vec!['a', 'e', '\u{0301}', 'b'];
        let c = compose_characters(&input);
        assert_eq!(c.text, vec!['a', 'é', 'b']);
        assert_eq!(c.cursor_to_original(0), 0);
        assert_eq!(c.cursor_to_original(1), 1);
        assert_eq!(c.cursor_to_original(2), 3);
        assert_eq!(c.cursor_to_original(3), 4); // sentinel: end of input
    }

    #[test]
    fn base_character_strips_accents() {
        assert_eq!(base_character('é'), 'e');
        assert_eq!(base_character('Å'), 'A');
        assert_eq!(base_character('a'), 'a');
        assert_eq!(base_character('?'), '?');
    }
}
