//! Table-format dispatch.
//!
//! The source-dialect variants share one runtime representation; what differs
//! is whether a dialect contracts at all and which classification extension
//! bits its finish hook assigns. The original design used a struct of
//! function pointers selected at load time; here that seam is a trait with
//! one static implementation per dialect.

use core_charset::{CharAttributes, CharacterEntry};
use core_table::TableFormat;

use crate::engine::{Pass, contract_walk};

/// Extension bit set by the libLouis dialect on characters it joins into
/// words (apostrophe, hyphen). The engine's cursor-word detection treats a
/// flagged character as part of the surrounding word, so expanding the word
/// under the cursor keeps a form like "don't" whole.
pub const EXT_JOINER: CharAttributes = CharAttributes::EXT0;

/// Per-dialect operations the engine dispatches through.
pub trait TranslationFormat: Sync {
    /// Walk the composed input applying this dialect's contraction behavior.
    /// Returns `false` when the dialect does not contract, sending the
    /// engine down the one-to-one transliteration path.
    fn contract_text(&self, pass: &mut Pass<'_>) -> bool;

    /// Add dialect-specific attribute bits to a freshly classified
    /// character. Runs once per character per table.
    fn finish_character_entry(&self, entry: &mut CharacterEntry);
}

pub struct NativeFormat;
pub struct LibLouisFormat;
pub struct BinaryLegacyFormat;

impl TranslationFormat for NativeFormat {
    fn contract_text(&self, pass: &mut Pass<'_>) -> bool {
        contract_walk(pass);
        true
    }

    fn finish_character_entry(&self, _entry: &mut CharacterEntry) {}
}

impl TranslationFormat for LibLouisFormat {
    fn contract_text(&self, pass: &mut Pass<'_>) -> bool {
        contract_walk(pass);
        true
    }

    fn finish_character_entry(&self, entry: &mut CharacterEntry) {
        if matches!(entry.value, '\'' | '-' | '\u{2019}') {
            entry.attributes |= EXT_JOINER;
        }
    }
}

impl TranslationFormat for BinaryLegacyFormat {
    /// Legacy dot-order tables carry no rules; report "not contracted" so
    /// the engine transliterates through the table's (remapped) dot map.
    fn contract_text(&self, _pass: &mut Pass<'_>) -> bool {
        false
    }

    fn finish_character_entry(&self, _entry: &mut CharacterEntry) {}
}

/// Select the operations for a table's format tag.
pub fn methods(format: TableFormat) -> &'static dyn TranslationFormat {
    match format {
        TableFormat::Native => &NativeFormat,
        TableFormat::LibLouis => &LibLouisFormat,
        TableFormat::BinaryLegacy => &BinaryLegacyFormat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_charset::CharacterSet;

    #[test]
    fn liblouis_marks_joiners() {
        let fmt = methods(TableFormat::LibLouis);
        let mut set = CharacterSet::new();
        let apostrophe = set.get_or_insert('\'', |e| fmt.finish_character_entry(e));
        assert!(apostrophe.attributes.contains(EXT_JOINER));
        let letter = set.get_or_insert('a', |e| fmt.finish_character_entry(e));
        assert!(!letter.attributes.contains(EXT_JOINER));
    }

    #[test]
    fn native_leaves_entries_alone() {
        let fmt = methods(TableFormat::Native);
        let mut set = CharacterSet::new();
        let apostrophe = set.get_or_insert('\'', |e| fmt.finish_character_entry(e));
        assert!(!apostrophe.attributes.contains(EXT_JOINER));
    }
}
