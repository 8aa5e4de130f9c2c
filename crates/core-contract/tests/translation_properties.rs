//! Property-based tests for the translation engine's output contract.

use core_contract::ContractText;
use core_table::{ContractionTable, NO_OFFSET, Prefs, TableBuilder};
use proptest::prelude::*;

/// A small literary-style table: letters, space, a few contractions.
fn table() -> ContractionTable {
    let mut b = TableBuilder::new().character(' ', 0).capital_sign(0x20);
    for (i, c) in ('a'..='z').enumerate() {
        b = b.character(c, (i as u8 + 1) | 0x40);
    }
    b.rule("the", &[0x2E])
        .rule("and", &[0x2F])
        .rule("er", &[0x31])
        .build()
        .unwrap()
}

fn input_strategy() -> impl Strategy<Value = Vec<char>> {
    proptest::collection::vec(
        prop_oneof![
            4 => proptest::char::range('a', 'z'),
            1 => Just(' '),
            1 => proptest::char::range('A', 'Z'),
        ],
        0..40,
    )
}

proptest! {
    // produced <= capacity and consumed <= input length, always.
    #[test]
    fn capacity_and_consumption_bounds(input in input_strategy(), cap in 0usize..48, cursor in proptest::option::of(0usize..40)) {
        let t = table();
        let out = t.translate(&input, cursor, cap, &Prefs::default(), true);
        prop_assert!(out.cells.len() <= cap);
        prop_assert!(out.consumed <= input.len());
        prop_assert_eq!(out.offsets.as_ref().unwrap().len(), out.consumed);
    }

    // Defined offsets are valid cell indices and non-decreasing across the input.
    #[test]
    fn offsets_valid_and_monotonic(input in input_strategy(), cap in 0usize..48) {
        let t = table();
        let out = t.translate(&input, None, cap, &Prefs::default(), true);
        let offsets = out.offsets.unwrap();
        let mut last = 0usize;
        for &o in &offsets {
            if o != NO_OFFSET {
                prop_assert!(o < out.cells.len());
                prop_assert!(o >= last);
                last = o;
            }
        }
    }

    // A truncated consumed count lands on a space boundary unless the cut
    // word reaches back to the start of the input.
    #[test]
    fn truncation_lands_on_word_boundary(input in input_strategy(), cap in 1usize..16) {
        let t = table();
        let out = t.translate(&input, None, cap, &Prefs::default(), false);
        let n = out.consumed;
        if n > 0 && n < input.len() {
            let space = |c: char| c.is_whitespace();
            let transition = space(input[n - 1]) != space(input[n]);
            // Forward-progress exception: the run containing the cut (plus a
            // leading space run before a word) stretches back to the start of
            // the input, so there was no earlier boundary to back up to.
            let mut i = n;
            while i > 0 && space(input[i - 1]) == space(input[n]) {
                i -= 1;
            }
            if !space(input[n]) {
                while i > 0 && space(input[i - 1]) {
                    i -= 1;
                }
            }
            prop_assert!(transition || i == 0);
        }
    }

    // Translating the same request twice is bit-identical and costs no
    // second rule-evaluation pass.
    #[test]
    fn idempotent_and_cached(input in input_strategy(), cap in 0usize..48, cursor in proptest::option::of(0usize..40)) {
        let t = table();
        let first = t.translate(&input, cursor, cap, &Prefs::default(), true);
        let passes = t.passes();
        let second = t.translate(&input, cursor, cap, &Prefs::default(), true);
        prop_assert_eq!(first, second);
        prop_assert_eq!(t.passes(), passes);
    }

    // An empty table renders every character as the all-dots unknown cell,
    // one cell per character, bounded by capacity.
    #[test]
    fn empty_table_is_deterministic(input in input_strategy(), cap in 0usize..48) {
        let t = TableBuilder::new().build().unwrap();
        let out = t.translate(&input, None, cap, &Prefs::default(), false);
        prop_assert!(out.cells.iter().all(|&c| c == 0xFF));
        if cap >= input.len() {
            prop_assert_eq!(out.consumed, input.len());
            prop_assert_eq!(out.cells.len(), input.len());
        }
    }
}
