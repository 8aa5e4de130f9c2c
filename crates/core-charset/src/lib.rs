//! Character classification table.
//!
//! Answers "what kind of character is this?" with memoized, sorted storage.
//! Entries are synthesized from the Unicode general category on first lookup,
//! inserted in codepoint order, and never deleted or reclassified for the
//! lifetime of the owning table. Lookup is a binary search over a sorted
//! `Vec`, replacing the manual realloc/memmove array of older designs.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CharAttributes: u16 {
        const SPACE       = 0b0000_0000_0000_0001;
        const LETTER      = 0b0000_0000_0000_0010;
        const DIGIT       = 0b0000_0000_0000_0100;
        const PUNCTUATION = 0b0000_0000_0000_1000;
        const UPPERCASE   = 0b0000_0000_0001_0000;
        const LOWERCASE   = 0b0000_0000_0010_0000;
        // Table-format extension bits; meaning is owned by the active format's
        // finish hook, the classifier never sets them.
        const EXT0 = 0b0000_0001_0000_0000;
        const EXT1 = 0b0000_0010_0000_0000;
        const EXT2 = 0b0000_0100_0000_0000;
        const EXT3 = 0b0000_1000_0000_0000;
        const EXT4 = 0b0001_0000_0000_0000;
        const EXT5 = 0b0010_0000_0000_0000;
        const EXT6 = 0b0100_0000_0000_0000;
        const EXT7 = 0b1000_0000_0000_0000;
    }
}

/// One Unicode codepoint's classification. `uppercase`/`lowercase` are
/// self-referential when the character is uncased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterEntry {
    pub value: char,
    pub uppercase: char,
    pub lowercase: char,
    pub attributes: CharAttributes,
}

impl CharacterEntry {
    /// Classify a character from its general category. Format extension bits
    /// are left clear for the caller's finish hook.
    fn synthesize(value: char) -> Self {
        let mut attributes = CharAttributes::empty();
        let mut uppercase = value;
        let mut lowercase = value;
        if value.is_whitespace() {
            attributes |= CharAttributes::SPACE;
        } else if value.is_alphabetic() {
            attributes |= CharAttributes::LETTER;
            uppercase = single_case_mapping(value.to_uppercase()).unwrap_or(value);
            lowercase = single_case_mapping(value.to_lowercase()).unwrap_or(value);
            if value.is_uppercase() {
                attributes |= CharAttributes::UPPERCASE;
            }
            if value.is_lowercase() {
                attributes |= CharAttributes::LOWERCASE;
            }
        } else if value.is_ascii_digit() || value.is_numeric() {
            attributes |= CharAttributes::DIGIT;
        } else {
            attributes |= CharAttributes::PUNCTUATION;
        }
        Self {
            value,
            uppercase,
            lowercase,
            attributes,
        }
    }

    pub fn is_space(&self) -> bool {
        self.attributes.contains(CharAttributes::SPACE)
    }

    pub fn is_letter(&self) -> bool {
        self.attributes.contains(CharAttributes::LETTER)
    }
}

/// Collapse a case-mapping iterator to one scalar; `None` for multi-char
/// expansions (e.g. ß → SS), which keep the original character instead.
fn single_case_mapping(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Growable codepoint-sorted classification store.
///
/// Monotonic: entries are only ever added. A character keeps its first
/// classification for the lifetime of this set even if later lookups would
/// have produced different extension bits.
#[derive(Debug)]
pub struct CharacterSet {
    entries: Vec<CharacterEntry>,
}

/// Initial backing allocation; growth doubles from here.
const INITIAL_CAPACITY: usize = 128;

impl Default for CharacterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterSet {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binary search by codepoint: `Ok(index)` of an existing entry or
    /// `Err(insertion_index)` where a new one would go.
    pub fn find(&self, character: char) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&character, |e| e.value)
    }

    /// Look up an existing entry without synthesizing one.
    pub fn get(&self, character: char) -> Option<&CharacterEntry> {
        self.find(character).ok().map(|i| &self.entries[i])
    }

    /// Return the entry for `character`, synthesizing and inserting it in
    /// sorted position on first encounter. `finish` is the active table
    /// format's hook for adding format-specific extension bits; it runs only
    /// on the newly created entry, never on revisits.
    pub fn get_or_insert(
        &mut self,
        character: char,
        finish: impl FnOnce(&mut CharacterEntry),
    ) -> CharacterEntry {
        match self.find(character) {
            Ok(i) => self.entries[i],
            Err(i) => {
                let mut entry = CharacterEntry::synthesize(character);
                finish(&mut entry);
                // Vec insert keeps the sorted-by-codepoint invariant; growth
                // follows Vec's doubling from the initial 128 reserve.
                self.entries.insert(i, entry);
                self.entries[i]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_finish(_: &mut CharacterEntry) {}

    #[test]
    fn classify_basic_categories() {
        let mut set = CharacterSet::new();
        let a = set.get_or_insert('a', no_finish);
        assert!(a.is_letter());
        assert!(a.attributes.contains(CharAttributes::LOWERCASE));
        assert_eq!(a.uppercase, 'A');
        assert_eq!(a.lowercase, 'a');

        let space = set.get_or_insert(' ', no_finish);
        assert!(space.is_space());

        let five = set.get_or_insert('5', no_finish);
        assert!(five.attributes.contains(CharAttributes::DIGIT));

        let dot = set.get_or_insert('.', no_finish);
        assert!(dot.attributes.contains(CharAttributes::PUNCTUATION));
        assert_eq!(dot.uppercase, '.');
    }

    #[test]
    fn uppercase_letter_pairs_down() {
        let mut set = CharacterSet::new();
        let z = set.get_or_insert('Z', no_finish);
        assert!(z.attributes.contains(CharAttributes::UPPERCASE));
        assert_eq!(z.lowercase, 'z');
        assert_eq!(z.uppercase, 'Z');
    }

    #[test]
    fn multichar_case_expansion_stays_self() {
        let mut set = CharacterSet::new();
        // ß uppercases to "SS"; the entry keeps itself rather than a pair.
        let eszett = set.get_or_insert('ß', no_finish);
        assert_eq!(eszett.uppercase, 'ß');
        assert_eq!(eszett.lowercase, 'ß');
    }

    #[test]
    fn entries_stay_sorted_and_memoized() {
        let mut set = CharacterSet::new();
        for c in ['m', 'a', 'z', 'a', 'b', 'm'] {
            set.get_or_insert(c, no_finish);
        }
        assert_eq!(set.len(), 4);
        assert_eq!(set.find('a'), Ok(0));
        assert_eq!(set.find('b'), Ok(1));
        assert_eq!(set.find('m'), Ok(2));
        assert_eq!(set.find('z'), Ok(3));
        assert!(matches!(set.find('c'), Err(2)));
    }

    #[test]
    fn finish_hook_runs_once() {
        let mut set = CharacterSet::new();
        let first = set.get_or_insert('q', |e| e.attributes |= CharAttributes::EXT0);
        assert!(first.attributes.contains(CharAttributes::EXT0));
        // Revisit must not re-run the hook (EXT1 would be added if it did).
        let again = set.get_or_insert('q', |e| e.attributes |= CharAttributes::EXT1);
        assert!(again.attributes.contains(CharAttributes::EXT0));
        assert!(!again.attributes.contains(CharAttributes::EXT1));
    }
}
