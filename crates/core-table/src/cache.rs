//! Incremental translation cache.
//!
//! Stores the last translation's full request and response so re-translating
//! unchanged screen content is a buffer copy instead of a rule-evaluation
//! pass. A `(hash, len)` snapshot of the input short-circuits most mismatches
//! before the exact content compare; the content compare is still what
//! decides a hit, the hash never admits one on its own.

use std::hash::{Hash, Hasher};

use ahash::AHasher;

use crate::{Prefs, Translation};

/// Everything a request must match exactly for the cached response to be
/// reused: input content, cursor (none vs position), output capacity, and
/// both preference flags.
#[derive(Debug, Clone, Copy)]
pub struct CacheKey<'a> {
    pub input: &'a [char],
    pub cursor: Option<usize>,
    pub max_cells: usize,
    pub prefs: Prefs,
}

#[derive(Debug)]
struct CacheEntry {
    hash: u64,
    cursor: Option<usize>,
    max_cells: usize,
    prefs: Prefs,
    input: Vec<char>,
    result: Translation,
}

/// Cache buffers grow in fixed blocks rather than exactly-to-fit, so a
/// viewport that jitters by a few characters doesn't reallocate every frame.
fn block_rounded(n: usize) -> usize {
    (n | 0x3F) + 1
}

fn snapshot_hash(input: &[char]) -> u64 {
    let mut hasher = AHasher::default();
    input.hash(&mut hasher);
    hasher.finish()
}

/// Single-slot cache owned by one table. One entry is all the refresh cycle
/// needs: either the screen didn't change since last time or it did.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entry: Option<CacheEntry>,
    hits: u64,
    misses: u64,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look the request up; a hit returns a copy of the cached response.
    pub fn lookup(&mut self, key: &CacheKey<'_>) -> Option<Translation> {
        let hash = snapshot_hash(key.input);
        let hit = self.entry.as_ref().is_some_and(|e| {
            e.hash == hash
                && e.cursor == key.cursor
                && e.max_cells == key.max_cells
                && e.prefs == key.prefs
                && e.input.len() == key.input.len()
                && e.input == key.input
        });
        if hit {
            self.hits += 1;
            self.entry.as_ref().map(|e| e.result.clone())
        } else {
            self.misses += 1;
            None
        }
    }

    /// Record a fresh translation. Existing buffers are reused when large
    /// enough; otherwise they grow to the next block boundary.
    pub fn store(&mut self, key: &CacheKey<'_>, result: &Translation) {
        let hash = snapshot_hash(key.input);
        match &mut self.entry {
            Some(e) => {
                copy_into(&mut e.input, key.input);
                copy_into(&mut e.result.cells, &result.cells);
                e.result.consumed = result.consumed;
                match (&mut e.result.offsets, &result.offsets) {
                    (Some(dst), Some(src)) => copy_into(dst, src),
                    (dst, src) => *dst = src.clone(),
                }
                e.hash = hash;
                e.cursor = key.cursor;
                e.max_cells = key.max_cells;
                e.prefs = key.prefs;
            }
            None => {
                let mut input = Vec::with_capacity(block_rounded(key.input.len()));
                input.extend_from_slice(key.input);
                let mut cells = Vec::with_capacity(block_rounded(result.cells.len()));
                cells.extend_from_slice(&result.cells);
                self.entry = Some(CacheEntry {
                    hash,
                    cursor: key.cursor,
                    max_cells: key.max_cells,
                    prefs: key.prefs,
                    input,
                    result: Translation {
                        cells,
                        consumed: result.consumed,
                        offsets: result.offsets.clone(),
                    },
                });
            }
        }
    }

    /// Drop the cached entry (table-level degradation path).
    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

fn copy_into<T: Copy>(dst: &mut Vec<T>, src: &[T]) {
    dst.clear();
    if dst.capacity() < src.len() {
        dst.reserve(block_rounded(src.len()) - dst.capacity());
    }
    dst.extend_from_slice(src);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NO_OFFSET;

    fn key(input: &[char], cursor: Option<usize>, max_cells: usize) -> CacheKey<'_> {
        CacheKey {
            input,
            cursor,
            max_cells,
            prefs: Prefs::default(),
        }
    }

    fn result() -> Translation {
        Translation {
            cells: vec![0x01, 0x03],
            consumed: 2,
            offsets: Some(vec![0, 1]),
        }
    }

    #[test]
    fn miss_then_hit() {
        let input: Vec<char> = "ab".chars().collect();
        let mut cache = TranslationCache::new();
        assert!(cache.lookup(&key(&input, None, 10)).is_none());
        cache.store(&key(&input, None, 10), &result());
        let out = cache.lookup(&key(&input, None, 10)).unwrap();
        assert_eq!(out, result());
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn any_key_field_change_misses() {
        let input: Vec<char> = "ab".chars().collect();
        let other: Vec<char> = "ac".chars().collect();
        let mut cache = TranslationCache::new();
        cache.store(&key(&input, Some(1), 10), &result());
        assert!(cache.lookup(&key(&other, Some(1), 10)).is_none());
        assert!(cache.lookup(&key(&input, None, 10)).is_none());
        assert!(cache.lookup(&key(&input, Some(0), 10)).is_none());
        assert!(cache.lookup(&key(&input, Some(1), 9)).is_none());
        let flipped = CacheKey {
            prefs: Prefs {
                expand_current_word: false,
                ..Prefs::default()
            },
            ..key(&input, Some(1), 10)
        };
        assert!(cache.lookup(&flipped).is_none());
        assert!(cache.lookup(&key(&input, Some(1), 10)).is_some());
    }

    #[test]
    fn store_overwrites_previous_entry() {
        let a: Vec<char> = "aaaa".chars().collect();
        let b: Vec<char> = "bb".chars().collect();
        let mut cache = TranslationCache::new();
        cache.store(&key(&a, None, 10), &result());
        let second = Translation {
            cells: vec![0xFF],
            consumed: 2,
            offsets: Some(vec![0, NO_OFFSET]),
        };
        cache.store(&key(&b, None, 10), &second);
        assert!(cache.lookup(&key(&a, None, 10)).is_none());
        assert_eq!(cache.lookup(&key(&b, None, 10)).unwrap(), second);
    }

    #[test]
    fn clear_forgets() {
        let input: Vec<char> = "ab".chars().collect();
        let mut cache = TranslationCache::new();
        cache.store(&key(&input, None, 10), &result());
        cache.clear();
        assert!(cache.lookup(&key(&input, None, 10)).is_none());
    }

    #[test]
    fn block_rounding_is_monotonic_blocks() {
        assert_eq!(block_rounded(0), 64);
        assert_eq!(block_rounded(63), 64);
        assert_eq!(block_rounded(64), 128);
        assert_eq!(block_rounded(130), 192);
    }
}
