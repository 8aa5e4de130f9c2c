//! Table construction.
//!
//! Stands in for the out-of-scope table compiler: loaders parse their source
//! dialect and feed definitions through this builder, tests build small
//! tables directly. Validation happens here so a published table never holds
//! a malformed rule.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;

use core_cell::DotMapping;
use core_charset::CharacterSet;
use thiserror::Error;

use crate::cache::TranslationCache;
use crate::{ContractionRule, ContractionTable, TableFormat};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableBuildError {
    #[error("contraction rule has an empty character sequence")]
    EmptyRule,
    /// Rules never span words; allowing spaces inside a rule would let a
    /// contraction cross the boundary the truncation logic backs up to.
    #[error("contraction rule {0:?} contains a space character")]
    SpaceInRule(String),
    #[error("dot order {0:?} is not a permutation of 1-8")]
    InvalidDotOrder([u8; 8]),
}

/// Builder for [`ContractionTable`]. Consuming-chain style:
///
/// ```
/// use core_table::TableBuilder;
/// let table = TableBuilder::new()
///     .character('a', 0x01)
///     .rule("and", &[0x2F])
///     .build()
///     .unwrap();
/// assert_eq!(table.dots_for('a'), Some(0x01));
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    format: TableFormat,
    dot_order: Option<[u8; 8]>,
    dots: HashMap<char, u8>,
    rules: Vec<(Vec<char>, Vec<u8>)>,
    capital_sign: Option<u8>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: TableFormat) -> Self {
        self.format = format;
        self
    }

    /// Physical dot order of this table's cell definitions (binary legacy
    /// tables). Validated at build time.
    pub fn dot_order(mut self, order: [u8; 8]) -> Self {
        self.dot_order = Some(order);
        self
    }

    /// Define the uncontracted cell for a character. Later definitions win.
    pub fn character(mut self, c: char, cell: u8) -> Self {
        self.dots.insert(c, cell);
        self
    }

    /// Define a contraction: `from` collapses to the given cells. An empty
    /// `cells` slice elides the sequence entirely.
    pub fn rule(mut self, from: &str, cells: &[u8]) -> Self {
        self.rules.push((from.chars().collect(), cells.to_vec()));
        self
    }

    /// Capital-indicator cell emitted in [`crate::CapitalizationMode::Sign`].
    pub fn capital_sign(mut self, cell: u8) -> Self {
        self.capital_sign = Some(cell);
        self
    }

    pub fn build(self) -> Result<ContractionTable, TableBuildError> {
        let dot_mapping = match self.dot_order {
            None => DotMapping::identity(),
            Some(order) => DotMapping::try_from_dot_order(order)
                .ok_or(TableBuildError::InvalidDotOrder(order))?,
        };

        let mut buckets: HashMap<char, Vec<ContractionRule>> = HashMap::new();
        for (from, to) in self.rules {
            let Some(&leading) = from.first() else {
                return Err(TableBuildError::EmptyRule);
            };
            if from.iter().any(|c| c.is_whitespace()) {
                return Err(TableBuildError::SpaceInRule(from.into_iter().collect()));
            }
            buckets
                .entry(leading)
                .or_default()
                .push(ContractionRule { from, to });
        }
        // Longest-match-first within each bucket; length ties resolve by
        // sequence order for determinism.
        for bucket in buckets.values_mut() {
            bucket.sort_by(|a, b| b.from.len().cmp(&a.from.len()).then(a.from.cmp(&b.from)));
        }

        Ok(ContractionTable {
            format: self.format,
            dot_mapping,
            dots: self.dots,
            rules: buckets,
            capital_sign: self.capital_sign,
            characters: Mutex::new(CharacterSet::new()),
            cache: Mutex::new(TranslationCache::new()),
            passes: AtomicU64::new(0),
        })
    }
}
