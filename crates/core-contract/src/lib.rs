//! Braille contraction/translation engine.
//!
//! Turns a viewport's worth of Unicode text into 8-dot braille cells,
//! optionally applying the loaded table's contraction rules, with a cursor
//! remapped through the transformation and an incremental cache so unchanged
//! screen content costs a copy instead of a rule-evaluation pass.
//!
//! The entry point is [`ContractText::translate`] on a
//! [`core_table::ContractionTable`]. It presents no error surface: every
//! internal failure degrades to the best achievable visual result, because a
//! screen reader must never stop rendering over one broken glyph or table.

use core_compose::{Composition, compose_characters};
use core_table::{CacheKey, ContractionTable, NO_OFFSET, Prefs, Translation};
use tracing::{debug, trace};

pub mod format;

mod engine;

pub use engine::Pass;

use engine::{fallback_walk, truncate_to_safe_boundary};
use format::methods;

/// The translation seam: one synchronous, non-blocking, infallible call.
pub trait ContractText {
    /// Translate `input` into at most `max_cells` output cells.
    ///
    /// `cursor` is an offset into `input` (`None` for no cursor). The
    /// response's `consumed` counts input characters actually represented;
    /// when not all input fits, the cut lands on a word boundary and the
    /// caller re-invokes with the remainder. `want_offsets` asks for the
    /// per-input-character map to output cell indices ([`NO_OFFSET`] for
    /// characters elided by contraction or composition).
    fn translate(
        &self,
        input: &[char],
        cursor: Option<usize>,
        max_cells: usize,
        prefs: &Prefs,
        want_offsets: bool,
    ) -> Translation;
}

impl ContractText for ContractionTable {
    fn translate(
        &self,
        input: &[char],
        cursor: Option<usize>,
        max_cells: usize,
        prefs: &Prefs,
        want_offsets: bool,
    ) -> Translation {
        let key = CacheKey {
            input,
            cursor,
            max_cells,
            prefs: *prefs,
        };
        if let Some(Some(mut hit)) = self.with_cache(|cache| cache.lookup(&key)) {
            trace!(chars = input.len(), cells = hit.cells.len(), "cache hit");
            if !want_offsets {
                hit.offsets = None;
            }
            return hit;
        }

        self.note_pass();
        let full = run_pass(self, input, cursor, max_cells, prefs);
        debug_assert!(full.cells.len() <= max_cells);
        debug_assert!(full.consumed <= input.len());

        // Cache update; a poisoned cache lock just means "always miss".
        if self.with_cache(|cache| cache.store(&key, &full)).is_none() {
            debug!("translation cache unavailable; result not cached");
        }

        let mut out = full;
        if !want_offsets {
            out.offsets = None;
        }
        out
    }
}

/// One full (non-cached) translation: compose, contract or transliterate,
/// truncate safely, and re-expand the results into original-input space.
fn run_pass(
    table: &ContractionTable,
    input: &[char],
    cursor: Option<usize>,
    max_cells: usize,
    prefs: &Prefs,
) -> Translation {
    if max_cells == 0 || input.is_empty() {
        return Translation {
            cells: Vec::new(),
            consumed: 0,
            offsets: Some(Vec::new()),
        };
    }

    let composition = compose_characters(input);
    let composed_cursor = cursor.map(|c| composition.cursor_to_composed(c));

    let format = methods(table.format());
    let mut pass = Pass::new(
        table,
        format,
        &composition.text,
        composed_cursor,
        prefs,
        max_cells,
    );
    if !format.contract_text(&mut pass) {
        fallback_walk(&mut pass);
    }
    truncate_to_safe_boundary(&mut pass);

    uncompose(&composition, pass)
}

/// Map a finished pass from composed-index space back to original offsets.
///
/// Each composed position owns a contiguous original range; the *last*
/// original character of a collapsed group keeps the real cell offset and the
/// earlier ones read [`NO_OFFSET`].
fn uncompose(composition: &Composition, pass: Pass<'_>) -> Translation {
    let consumed_composed = pass.pos;
    if composition.is_identity() {
        return Translation {
            cells: pass.cells,
            consumed: consumed_composed,
            offsets: Some(pass.offsets),
        };
    }
    let consumed = composition.cursor_to_original(consumed_composed);
    let mut offsets = vec![NO_OFFSET; consumed];
    for (i, &cell_offset) in pass.offsets.iter().enumerate().take(consumed_composed) {
        let group_end = composition.index_map[i + 1];
        offsets[group_end - 1] = cell_offset;
    }
    Translation {
        cells: pass.cells,
        consumed,
        offsets: Some(offsets),
    }
}
