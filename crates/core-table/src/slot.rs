//! Runtime table replacement.
//!
//! The active table pointer is the one piece of state shared between the
//! refresh thread (many concurrent readers) and the table-replacement path
//! (one infrequent writer). Readers clone the `Arc` out under a read lock
//! held only for the pointer copy; rule evaluation then proceeds lock-free
//! against the immutable table. Replacement builds the new table fully
//! before taking any lock, so readers only ever observe a complete table,
//! and a failed build leaves the old one active.

use std::sync::{Arc, RwLock};

use anyhow::Result;
use tracing::{info, warn};

use crate::ContractionTable;

/// Shared handle to the active contraction table.
#[derive(Debug, Clone)]
pub struct TableSlot {
    inner: Arc<RwLock<Arc<ContractionTable>>>,
}

impl TableSlot {
    pub fn new(table: ContractionTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    /// Current table. The read lock covers only the pointer clone, never a
    /// translation. A poisoned lock still yields the stored pointer: tables
    /// are never left half-written (the write path only swaps whole `Arc`s).
    pub fn current(&self) -> Arc<ContractionTable> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Build a replacement table and swap it in.
    ///
    /// `build` runs entirely outside the lock; on error the active table is
    /// untouched and the error propagates to the caller (e.g. an unparsable
    /// table file keeps the previous braille code live). The displaced table
    /// is dropped after the write lock is released, so in-flight readers
    /// holding clones of it finish undisturbed.
    pub fn replace_with(&self, build: impl FnOnce() -> Result<ContractionTable>) -> Result<()> {
        let fresh = match build() {
            Ok(table) => Arc::new(table),
            Err(err) => {
                warn!(error = %err, "table replacement failed; keeping active table");
                return Err(err);
            }
        };
        let old = {
            let mut guard = match self.inner.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::replace(&mut *guard, fresh)
        };
        info!("contraction table replaced");
        drop(old);
        Ok(())
    }
}
