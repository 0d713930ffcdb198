#![forbid(unsafe_code)]

//! Cumulative offset table with binary-searched visible ranges.
//!
//! # Layout
//!
//! The table stores one [`Span`] per unit in a contiguous `Vec`, so both
//! searches are plain `partition_point` calls over monotonically increasing
//! offsets.
//!
//! # Operations
//!
//! | Operation | Time | Allocations |
//! |-----------|------|-------------|
//! | `build(n, size_of)` | O(n) | 1 Vec |
//! | `span(i)` | O(1) | 0 |
//! | `index_at(offset)` | O(log n) | 0 |
//! | `visible_range(..)` | O(log n) | 0 |
//!
//! # Boundaries
//!
//! Spans are half-open `[start, end)`. A scroll offset that lands exactly on
//! a boundary belongs to the unit that *starts* there; the unit that ends
//! there is not visible. Likewise a unit starting exactly at the trailing
//! edge of the viewport is not visible.
//!
//! # Invariants
//!
//! 1. `span(0).start == 0` and `span(i).start == span(i - 1).end`.
//! 2. `span(i).end - span(i).start == size_of(i)` (sizes sanitised to `>= 0`).
//! 3. `total_extent() == span(n - 1).end`, or `0` when empty.
//! 4. `visible_range` never yields indices outside `0..n`; it is `0..0` iff `n == 0`.

use std::ops::Range;

use pwin_core::sanitize_extent;

/// Extent occupied by one unit along the scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Span {
    /// Offset of the leading edge.
    pub start: f64,
    /// Offset of the trailing edge (exclusive).
    pub end: f64,
}

impl Span {
    /// Size of the span.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `offset` falls in `[start, end)`.
    #[must_use]
    pub fn contains(&self, offset: f64) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Cumulative spans for `n` units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffsetTable {
    spans: Vec<Span>,
}

impl OffsetTable {
    /// Build spans for `count` units, asking `size_of` once per index.
    ///
    /// Negative or non-finite sizes are treated as zero.
    pub fn build<F>(count: usize, mut size_of: F) -> Self
    where
        F: FnMut(usize) -> f64,
    {
        let mut spans = Vec::with_capacity(count);
        let mut start = 0.0;
        for i in 0..count {
            let end = start + sanitize_extent(size_of(i));
            spans.push(Span { start, end });
            start = end;
        }
        Self { spans }
    }

    /// Number of units.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether there are no units.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Span of unit `index`.
    #[must_use]
    pub fn span(&self, index: usize) -> Option<Span> {
        self.spans.get(index).copied()
    }

    /// All spans in index order.
    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Total extent of all units.
    #[must_use]
    pub fn total_extent(&self) -> f64 {
        self.spans.last().map_or(0.0, |s| s.end)
    }

    /// Unit whose span contains `offset`.
    ///
    /// Offsets before the content map to unit 0; offsets at or past the end
    /// return `None`.
    #[must_use]
    pub fn index_at(&self, offset: f64) -> Option<usize> {
        let offset = if offset.is_nan() { 0.0 } else { offset };
        let idx = self.spans.partition_point(|s| s.end <= offset);
        (idx < self.spans.len()).then_some(idx)
    }

    /// Units intersecting `[scroll_offset, scroll_offset + viewport_size)`,
    /// widened by `overscan` on each side and clamped to `0..len()`.
    ///
    /// Returns `0..0` when the table is empty. Offsets past the content clamp
    /// to the last unit, so the range is never empty otherwise.
    #[must_use]
    pub fn visible_range(
        &self,
        scroll_offset: f64,
        viewport_size: f64,
        overscan: usize,
    ) -> Range<usize> {
        let exact = self.exact_range(scroll_offset, viewport_size);
        if exact.is_empty() {
            return exact;
        }
        let start = exact.start.saturating_sub(overscan);
        let end = exact.end.saturating_add(overscan).min(self.len());
        start..end
    }

    /// Like [`visible_range`](Self::visible_range) without overscan.
    #[must_use]
    pub fn exact_range(&self, scroll_offset: f64, viewport_size: f64) -> Range<usize> {
        let n = self.len();
        if n == 0 {
            return 0..0;
        }
        let scroll = sanitize_extent(scroll_offset);
        let limit = scroll + sanitize_extent(viewport_size);

        // Smallest index whose end lies strictly past the scroll offset.
        let start = self.spans.partition_point(|s| s.end <= scroll).min(n - 1);
        // One past the largest index starting strictly before the trailing edge.
        let end = self.spans.partition_point(|s| s.start < limit);
        start..end.max(start + 1).min(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize, size: f64) -> OffsetTable {
        OffsetTable::build(n, |_| size)
    }

    #[test]
    fn empty_table() {
        let t = OffsetTable::build(0, |_| 10.0);
        assert!(t.is_empty());
        assert_eq!(t.total_extent(), 0.0);
        assert_eq!(t.visible_range(0.0, 100.0, 3), 0..0);
        assert_eq!(t.index_at(0.0), None);
    }

    #[test]
    fn spans_are_cumulative() {
        let sizes = [20.0, 30.0, 10.0, 40.0, 25.0];
        let t = OffsetTable::build(sizes.len(), |i| sizes[i]);
        assert_eq!(t.span(0), Some(Span { start: 0.0, end: 20.0 }));
        assert_eq!(t.span(3), Some(Span { start: 60.0, end: 100.0 }));
        assert_eq!(t.total_extent(), 125.0);
        assert_eq!(t.span(5), None);
    }

    #[test]
    fn negative_sizes_become_zero() {
        let t = OffsetTable::build(3, |i| if i == 1 { -5.0 } else { 10.0 });
        assert_eq!(t.span(1).map(|s| s.size()), Some(0.0));
        assert_eq!(t.total_extent(), 20.0);
    }

    #[test]
    fn rows_scenario() {
        // 60 records, 3 per row, row height 100.
        let t = uniform(20, 100.0);
        assert_eq!(t.total_extent(), 2000.0);
        // [150, 450) touches rows 1..=4.
        assert_eq!(t.exact_range(150.0, 300.0), 1..5);
        assert_eq!(t.visible_range(150.0, 300.0, 1), 0..6);
    }

    #[test]
    fn boundary_belongs_to_next_unit() {
        let t = uniform(10, 100.0);
        // Row 0 ends at 100, so it is not visible from offset 100.
        assert_eq!(t.exact_range(100.0, 100.0), 1..2);
        // Row 3 starts at 300 == trailing edge, so it is excluded.
        assert_eq!(t.exact_range(100.0, 200.0), 1..3);
        assert_eq!(t.index_at(100.0), Some(1));
        assert_eq!(t.index_at(99.9), Some(0));
    }

    #[test]
    fn overscan_clamps_to_bounds() {
        let t = uniform(5, 10.0);
        assert_eq!(t.visible_range(0.0, 10.0, 100), 0..5);
        assert_eq!(t.visible_range(40.0, 10.0, 1), 3..5);
    }

    #[test]
    fn offset_past_end_clamps_to_last() {
        let t = uniform(5, 10.0);
        assert_eq!(t.exact_range(1_000.0, 10.0), 4..5);
        assert_eq!(t.index_at(50.0), None);
    }

    #[test]
    fn zero_viewport_still_yields_one_unit() {
        let t = uniform(5, 10.0);
        assert_eq!(t.exact_range(25.0, 0.0), 2..3);
    }

    #[test]
    fn negative_scroll_is_top() {
        let t = uniform(5, 10.0);
        assert_eq!(t.exact_range(-50.0, 15.0), 0..2);
        assert_eq!(t.index_at(-1.0), Some(0));
    }

    #[test]
    fn variable_sizes_search() {
        let sizes = [20.0, 30.0, 10.0, 40.0, 25.0];
        let t = OffsetTable::build(sizes.len(), |i| sizes[i]);
        // [55, 65) covers unit 2 [50,60) and unit 3 [60,100).
        assert_eq!(t.exact_range(55.0, 10.0), 2..4);
        assert_eq!(t.visible_range(55.0, 10.0, 1), 1..5);
    }

    #[test]
    fn zero_sized_units_are_skipped_at_offset() {
        let sizes = [0.0, 0.0, 10.0, 10.0];
        let t = OffsetTable::build(sizes.len(), |i| sizes[i]);
        assert_eq!(t.exact_range(0.0, 5.0), 2..3);
    }
}
