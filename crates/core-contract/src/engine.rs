//! The contraction walk and its supporting passes.
//!
//! Everything here operates in composed-index space; the caller in `lib.rs`
//! owns composition, cache, and the re-expansion of results back to original
//! offsets. A [`Pass`] is transient per-translation state; the only state
//! that survives a call lives in the table's cache.

use std::ops::Range;

use core_cell::ALL_DOTS;
use core_charset::{CharAttributes, CharacterEntry};
use core_compose::base_character;
use core_table::{CapitalizationMode, ContractionTable, NO_OFFSET, Prefs};

use crate::format::{EXT_JOINER, TranslationFormat};

/// Transient per-translation state over the composed input.
///
/// Invariants: `pos <= input.len()`, `cells.len() <= max_cells`, and
/// `offsets.len() == pos` at every emission boundary.
pub struct Pass<'a> {
    table: &'a ContractionTable,
    format: &'a dyn TranslationFormat,
    input: &'a [char],
    prefs: &'a Prefs,
    max_cells: usize,
    /// Word containing the cursor, when current-word expansion applies.
    cursor_word: Option<Range<usize>>,
    pub(crate) pos: usize,
    pub(crate) cells: Vec<u8>,
    pub(crate) offsets: Vec<usize>,
}

impl<'a> Pass<'a> {
    pub(crate) fn new(
        table: &'a ContractionTable,
        format: &'a dyn TranslationFormat,
        input: &'a [char],
        cursor: Option<usize>,
        prefs: &'a Prefs,
        max_cells: usize,
    ) -> Self {
        let mut pass = Self {
            table,
            format,
            input,
            prefs,
            max_cells,
            cursor_word: None,
            pos: 0,
            cells: Vec::with_capacity(max_cells.min(256)),
            offsets: Vec::with_capacity(input.len()),
        };
        pass.cursor_word = pass.locate_cursor_word(cursor);
        pass
    }

    fn entry(&self, c: char) -> CharacterEntry {
        let format = self.format;
        self.table
            .character_with(c, |e| format.finish_character_entry(e))
    }

    fn is_space(&self, index: usize) -> bool {
        self.entry(self.input[index]).is_space()
    }

    /// True when the character at `index` belongs to a word for expansion
    /// purposes: letters, digits, and anything the active dialect's finish
    /// hook flagged as a joiner (apostrophe and hyphen under libLouis).
    fn is_word_char(&self, index: usize) -> bool {
        let entry = self.entry(self.input[index]);
        entry.is_letter() || entry.attributes.intersects(CharAttributes::DIGIT | EXT_JOINER)
    }

    /// Word around the cursor, when the expansion preference is on and the
    /// cursor sits on a word character.
    fn locate_cursor_word(&self, cursor: Option<usize>) -> Option<Range<usize>> {
        if !self.prefs.expand_current_word {
            return None;
        }
        let cur = cursor?;
        if cur >= self.input.len() || !self.is_word_char(cur) {
            return None;
        }
        let mut start = cur;
        while start > 0 && self.is_word_char(start - 1) {
            start -= 1;
        }
        let mut end = cur + 1;
        while end < self.input.len() && self.is_word_char(end) {
            end += 1;
        }
        Some(start..end)
    }

    fn in_cursor_word(&self, index: usize) -> bool {
        self.cursor_word
            .as_ref()
            .is_some_and(|word| word.contains(&index))
    }

    /// Emit the cells for one literal (uncontracted) character. Returns
    /// `false` when the emission does not fit in the remaining capacity, in
    /// which case nothing is emitted and the walk must stop.
    fn emit_literal(&mut self) -> bool {
        let c = self.input[self.pos];
        let entry = self.entry(c);
        let is_upper = entry.attributes.contains(CharAttributes::UPPERCASE);
        let sign = match self.prefs.capitalization {
            CapitalizationMode::Sign if is_upper => self.table.capital_sign(),
            _ => None,
        };
        let needed = 1 + usize::from(sign.is_some());
        if self.cells.len() + needed > self.max_cells {
            return false;
        }
        // Fold mode always renders the lowercase cell; Sign mode does too
        // once the indicator carries the case. Only an uppercase letter with
        // no indicator available keeps its own cell definition.
        let folded = is_upper
            && (self.prefs.capitalization == CapitalizationMode::Fold || sign.is_some());
        let target = if folded { entry.lowercase } else { c };
        let first_cell = self.cells.len();
        let letter_cell = self.resolve_dots(target, &entry);
        if let Some(sign_cell) = sign {
            self.cells.push(sign_cell);
        }
        self.cells.push(letter_cell);
        self.offsets.push(first_cell);
        self.pos += 1;
        true
    }

    /// Dot resolution for a character with no direct definition, in priority
    /// order: defined dots → case-folded equivalent → accent-stripped
    /// equivalent → replacement character → `?` → all eight dots.
    fn resolve_dots(&self, c: char, entry: &CharacterEntry) -> u8 {
        if let Some(cell) = self.table.dots_for(c) {
            return cell;
        }
        for folded in [entry.lowercase, entry.uppercase] {
            if folded != c {
                if let Some(cell) = self.table.dots_for(folded) {
                    return cell;
                }
            }
        }
        let base = base_character(c);
        if base != c {
            if let Some(cell) = self.table.dots_for(base) {
                return cell;
            }
            let folded_base = base.to_lowercase().next().unwrap_or(base);
            if folded_base != base {
                if let Some(cell) = self.table.dots_for(folded_base) {
                    return cell;
                }
            }
        }
        if let Some(cell) = self.table.dots_for('\u{FFFD}') {
            return cell;
        }
        if let Some(cell) = self.table.dots_for('?') {
            return cell;
        }
        ALL_DOTS
    }

    /// Longest matching contraction rule at the current position, if any.
    fn matching_rule(&self) -> Option<&'a core_table::ContractionRule> {
        let rest = &self.input[self.pos..];
        self.table
            .rules_for(rest[0])
            .iter()
            .find(|rule| rest.starts_with(&rule.from))
    }
}

/// The shared contraction walk: longest-match-first rules, current-word
/// expansion, capitalization handling, capacity-bounded.
pub(crate) fn contract_walk(pass: &mut Pass<'_>) {
    while pass.pos < pass.input.len() {
        let rule = if pass.in_cursor_word(pass.pos) {
            // The user's cursor is in this word: show it letter by letter.
            None
        } else {
            pass.matching_rule()
        };
        match rule {
            Some(rule) => {
                if pass.cells.len() + rule.to.len() > pass.max_cells {
                    break;
                }
                let first_cell = pass.cells.len();
                pass.cells.extend_from_slice(&rule.to);
                // The first consumed character carries the cell index; the
                // rest of the sequence was elided into it.
                pass.offsets.push(if rule.to.is_empty() {
                    NO_OFFSET
                } else {
                    first_cell
                });
                for _ in 1..rule.from.len() {
                    pass.offsets.push(NO_OFFSET);
                }
                pass.pos += rule.from.len();
            }
            None => {
                if !pass.emit_literal() {
                    break;
                }
            }
        }
    }
}

/// One-character-to-one-cell transliteration, used when the table's format
/// does not contract. Consumes and produces in lockstep.
pub(crate) fn fallback_walk(pass: &mut Pass<'_>) {
    while pass.pos < pass.input.len() && pass.cells.len() < pass.max_cells {
        let c = pass.input[pass.pos];
        let entry = pass.entry(c);
        let cell = pass.resolve_dots(c, &entry);
        pass.offsets.push(pass.cells.len());
        pass.cells.push(cell);
        pass.pos += 1;
    }
}

/// Walk back from a capacity cut to a safe boundary.
///
/// A cut that already sits on a space/non-space transition (or consumed
/// everything) stands. A cut inside a word hands the whole word back along
/// with the space run before it, so the word containing the cursor is never
/// split across two calls. A cut inside a space run backs up to the run
/// start. When backing up would consume nothing (one unbroken run
/// wider than the whole display), the mid-run cut is kept: forward progress
/// wins.
pub(crate) fn truncate_to_safe_boundary(pass: &mut Pass<'_>) {
    let pos = pass.pos;
    if pos == 0 || pos == pass.input.len() {
        return;
    }
    let run_is_space = pass.is_space(pos);
    if pass.is_space(pos - 1) != run_is_space {
        return; // already on a transition
    }
    let mut new_pos = pos;
    while new_pos > 0 && pass.is_space(new_pos - 1) == run_is_space {
        new_pos -= 1;
    }
    if !run_is_space {
        // A partial word is handed back whole, together with the space run
        // before it, so the cut lands on the word's leading boundary.
        while new_pos > 0 && pass.is_space(new_pos - 1) {
            new_pos -= 1;
        }
    }
    if new_pos == 0 {
        return;
    }
    // Drop cells attributed to the positions being handed back.
    let cut_cell = pass.offsets[new_pos..]
        .iter()
        .copied()
        .filter(|&o| o != NO_OFFSET)
        .min()
        .unwrap_or(pass.cells.len());
    pass.cells.truncate(cut_cell);
    pass.offsets.truncate(new_pos);
    pass.pos = new_pos;
}
