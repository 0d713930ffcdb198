#![forbid(unsafe_code)]

//! Memoized offset table.
//!
//! Building an [`OffsetTable`] is O(n) and dominates per-signal cost, while
//! most signals (scrolls) change neither the unit count nor the sizing. The
//! cache keys the table on `(count, fingerprint)` and rebuilds only when the
//! key changes.
//!
//! ```
//! use pwin_layout::{ItemExtent, OffsetCache};
//!
//! let extent = ItemExtent::fixed(100.0);
//! let mut cache = OffsetCache::new();
//! let total = cache
//!     .get_or_build(20, extent.fingerprint(), |i| extent.size_of(i))
//!     .total_extent();
//! assert_eq!(total, 2000.0);
//!
//! // Same key: no rebuild.
//! cache.get_or_build(20, extent.fingerprint(), |i| extent.size_of(i));
//! assert_eq!(cache.rebuilds(), 1);
//! ```

use crate::offsets::OffsetTable;

/// Offset table keyed on `(count, fingerprint)`.
#[derive(Debug, Clone, Default)]
pub struct OffsetCache {
    key: Option<(usize, u64)>,
    table: OffsetTable,
    rebuilds: u64,
}

impl OffsetCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the table for `(count, fingerprint)`, rebuilding with `size_of`
    /// only when the key differs from the cached one.
    pub fn get_or_build<F>(&mut self, count: usize, fingerprint: u64, size_of: F) -> &OffsetTable
    where
        F: FnMut(usize) -> f64,
    {
        let key = (count, fingerprint);
        if self.key != Some(key) {
            self.table = OffsetTable::build(count, size_of);
            self.key = Some(key);
            self.rebuilds += 1;
        }
        &self.table
    }

    /// The most recently built table.
    #[must_use]
    pub fn table(&self) -> &OffsetTable {
        &self.table
    }

    /// Whether the cached table matches `(count, fingerprint)`.
    #[must_use]
    pub fn is_current(&self, count: usize, fingerprint: u64) -> bool {
        self.key == Some((count, fingerprint))
    }

    /// Force the next lookup to rebuild.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    /// Number of rebuilds so far.
    #[must_use]
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
