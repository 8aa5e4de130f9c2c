//! Compiled contraction table: the opaque rule artifact the translation
//! engine queries.
//!
//! A table owns its per-character dot map, its contraction rules (bucketed by
//! leading character, longest first), a lazily grown classification set, and
//! the translation cache. Everything except the classification set and the
//! cache is immutable after build, which is what makes the hot-swap slot in
//! [`slot`] safe to read without holding a lock across a translation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use core_cell::DotMapping;
use core_charset::{CharacterEntry, CharacterSet};

pub mod builder;
pub mod cache;
pub mod slot;

pub use builder::{TableBuildError, TableBuilder};
pub use cache::{CacheKey, TranslationCache};
pub use slot::TableSlot;

/// Sentinel in an offset map for an input character that contributed to no
/// output cell (elided by contraction or collapsed by composition). Never a
/// valid cell index.
pub const NO_OFFSET: usize = usize::MAX;

/// How case transitions are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapitalizationMode {
    /// Uppercase letters fold to their lowercase cell.
    Fold,
    /// An explicit capital-indicator cell precedes each uppercase letter,
    /// when the table defines one (falls back to folding otherwise).
    #[default]
    Sign,
}

/// The two per-request preference flags the cache keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefs {
    /// Show the word under the cursor uncontracted, letter by letter.
    pub expand_current_word: bool,
    pub capitalization: CapitalizationMode,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            expand_current_word: true,
            capitalization: CapitalizationMode::Sign,
        }
    }
}

/// A translation response: output cells, input characters consumed, and the
/// optional map from each consumed input character to the output cell it
/// contributed to ([`NO_OFFSET`] when it contributed to none).
///
/// Invariants upheld by the engine: `cells.len()` never exceeds the requested
/// capacity, `consumed` never exceeds the input length, and when present
/// `offsets.len() == consumed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Translation {
    pub cells: Vec<u8>,
    pub consumed: usize,
    pub offsets: Option<Vec<usize>>,
}

/// Source table dialect. Rule semantics are shared; formats differ in the
/// classification extension bits their finish hook assigns and in whether
/// they contract at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFormat {
    #[default]
    Native,
    LibLouis,
    /// Binary legacy dot-order tables carry a character map and a dot
    /// permutation but no contraction rules.
    BinaryLegacy,
}

/// One multi-character-to-cells mapping. `to` may be empty (pure elision).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractionRule {
    pub from: Vec<char>,
    pub to: Vec<u8>,
}

static EMPTY_RULES: &[ContractionRule] = &[];

/// The compiled, loaded artifact. Construct through [`TableBuilder`];
/// replace at runtime through [`TableSlot`].
#[derive(Debug)]
pub struct ContractionTable {
    format: TableFormat,
    dot_mapping: DotMapping,
    dots: HashMap<char, u8>,
    rules: HashMap<char, Vec<ContractionRule>>,
    capital_sign: Option<u8>,
    characters: Mutex<CharacterSet>,
    cache: Mutex<TranslationCache>,
    /// Real (non-cached) rule-evaluation passes; test instrumentation for the
    /// cache-hit property.
    passes: AtomicU64,
}

impl ContractionTable {
    pub fn format(&self) -> TableFormat {
        self.format
    }

    pub fn dot_mapping(&self) -> DotMapping {
        self.dot_mapping
    }

    /// Dots defined for a character, already remapped into standard order.
    pub fn dots_for(&self, character: char) -> Option<u8> {
        self.dots
            .get(&character)
            .map(|&cell| self.dot_mapping.remap(cell))
    }

    /// Capital-indicator cell, when the table defines one.
    pub fn capital_sign(&self) -> Option<u8> {
        self.capital_sign.map(|cell| self.dot_mapping.remap(cell))
    }

    /// Whether any character has defined dots (empty tables force the
    /// unknown-character fallback for everything).
    pub fn has_dots(&self) -> bool {
        !self.dots.is_empty()
    }

    /// Contraction rules starting with `leading`, longest first.
    pub fn rules_for(&self, leading: char) -> &[ContractionRule] {
        self.rules.get(&leading).map_or(EMPTY_RULES, Vec::as_slice)
    }

    /// Classification entry for a character, synthesized on first encounter.
    /// `finish` is the active format's extension-bit hook (runs once per
    /// character per table). A poisoned classification lock degrades to a
    /// throwaway entry rather than failing the translation.
    pub fn character_with(
        &self,
        character: char,
        finish: impl FnOnce(&mut CharacterEntry),
    ) -> CharacterEntry {
        match self.characters.lock() {
            Ok(mut set) => set.get_or_insert(character, finish),
            Err(poisoned) => poisoned.into_inner().get_or_insert(character, finish),
        }
    }

    /// Number of distinct characters classified so far.
    pub fn classified_count(&self) -> usize {
        match self.characters.lock() {
            Ok(set) => set.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Run `f` against the table's translation cache. Returns `None` (cache
    /// treated as absent) if the cache lock is poisoned.
    pub fn with_cache<R>(&self, f: impl FnOnce(&mut TranslationCache) -> R) -> Option<R> {
        match self.cache.lock() {
            Ok(mut cache) => Some(f(&mut cache)),
            Err(_) => None,
        }
    }

    /// Record one real rule-evaluation pass (cache misses only).
    pub fn note_pass(&self) {
        self.passes.fetch_add(1, Ordering::Relaxed);
    }

    /// Total real rule-evaluation passes since load.
    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_cell::dots;

    fn table() -> ContractionTable {
        TableBuilder::new()
            .character('a', dots(&[1]))
            .character('b', dots(&[1, 2]))
            .rule("ab", &[dots(&[1, 2, 3])])
            .rule("abc", &[dots(&[1, 2, 3, 4])])
            .build()
            .unwrap()
    }

    #[test]
    fn dots_lookup() {
        let t = table();
        assert_eq!(t.dots_for('a'), Some(0x01));
        assert_eq!(t.dots_for('b'), Some(0x03));
        assert_eq!(t.dots_for('z'), None);
        assert!(t.has_dots());
    }

    #[test]
    fn rules_bucketed_longest_first() {
        let t = table();
        let bucket = t.rules_for('a');
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket[0].from, vec!['a', 'b', 'c']);
        assert_eq!(bucket[1].from, vec!['a', 'b']);
        assert!(t.rules_for('q').is_empty());
    }

    #[test]
    fn classification_is_memoized_per_table() {
        let t = table();
        assert_eq!(t.classified_count(), 0);
        let e = t.character_with('a', |_| {});
        assert!(e.is_letter());
        t.character_with('a', |_| {});
        t.character_with(' ', |_| {});
        assert_eq!(t.classified_count(), 2);
    }

    #[test]
    fn pass_counter_accumulates() {
        let t = table();
        assert_eq!(t.passes(), 0);
        t.note_pass();
        t.note_pass();
        assert_eq!(t.passes(), 2);
    }
}
