//! Property-based invariant tests for offset tables and visible ranges.
//!
//! 1. Spans are contiguous and start at zero.
//! 2. `visible_range` stays within `0..n` and is empty iff `n == 0`.
//! 3. For any scroll offset in `[0, total - viewport]`, the exact range covers
//!    `[scroll, scroll + viewport)`.
//! 4. Overscan only widens the exact range.
//! 5. `index_at` agrees with a linear scan.
//! 6. Cached tables equal freshly built ones.

use pwin_layout::{ColumnPolicy, GridLayout, Layout, OffsetCache, OffsetTable};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

fn sizes_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![Just(0.0f64), 1.0f64..=500.0, (1u32..=400).prop_map(f64::from)],
        0..200,
    )
}

fn table(sizes: &[f64]) -> OffsetTable {
    OffsetTable::build(sizes.len(), |i| sizes[i])
}

proptest! {
    #[test]
    fn spans_are_contiguous(sizes in sizes_strategy()) {
        let t = table(&sizes);
        let mut expected_start = 0.0;
        for (i, span) in t.spans().iter().enumerate() {
            prop_assert_eq!(span.start, expected_start, "gap before {}", i);
            prop_assert!((span.size() - sizes[i]).abs() < 1e-9);
            expected_start = span.end;
        }
        prop_assert_eq!(t.total_extent(), expected_start);
    }

    #[test]
    fn range_within_bounds(
        sizes in sizes_strategy(),
        scroll in -1_000.0f64..100_000.0,
        viewport in 0.0f64..5_000.0,
        overscan in 0usize..10,
    ) {
        let t = table(&sizes);
        let r = t.visible_range(scroll, viewport, overscan);
        if sizes.is_empty() {
            prop_assert_eq!(r, 0..0);
        } else {
            prop_assert!(r.start < r.end);
            prop_assert!(r.end <= sizes.len());
        }
    }

    #[test]
    fn exact_range_covers_viewport(
        sizes in prop::collection::vec(1.0f64..=300.0, 1..150),
        frac in 0.0f64..=1.0,
        viewport in 0.0f64..2_000.0,
    ) {
        let t = table(&sizes);
        let total = t.total_extent();
        prop_assume!(viewport <= total);
        let scroll = (total - viewport) * frac;
        let r = t.exact_range(scroll, viewport);
        let first = t.span(r.start).unwrap();
        let last = t.span(r.end - 1).unwrap();
        prop_assert!(first.start <= scroll, "first {:?} after scroll {}", first, scroll);
        prop_assert!(last.end >= scroll + viewport - 1e-9, "last {:?} short of {}", last, scroll + viewport);
        // Nothing outside the range intersects the viewport.
        if r.start > 0 {
            prop_assert!(t.span(r.start - 1).unwrap().end <= scroll);
        }
        if r.end < sizes.len() {
            prop_assert!(t.span(r.end).unwrap().start >= scroll + viewport);
        }
    }

    #[test]
    fn overscan_only_widens(
        sizes in prop::collection::vec(1.0f64..=100.0, 1..100),
        scroll in 0.0f64..5_000.0,
        viewport in 0.0f64..1_000.0,
        overscan in 0usize..8,
    ) {
        let t = table(&sizes);
        let exact = t.exact_range(scroll, viewport);
        let wide = t.visible_range(scroll, viewport, overscan);
        prop_assert!(wide.start <= exact.start && exact.end <= wide.end);
        prop_assert_eq!(wide.start, exact.start.saturating_sub(overscan));
        prop_assert_eq!(wide.end, (exact.end + overscan).min(sizes.len()));
    }

    #[test]
    fn index_at_matches_linear_scan(
        sizes in sizes_strategy(),
        offset in 0.0f64..50_000.0,
    ) {
        let t = table(&sizes);
        let linear = t.spans().iter().position(|s| s.contains(offset));
        prop_assert_eq!(t.index_at(offset), linear);
    }

    #[test]
    fn cache_matches_fresh_build(
        counts in prop::collection::vec(0usize..120, 1..12),
        per_row in 1usize..6,
        row_height in 1.0f64..400.0,
    ) {
        let layout = Layout::Grid(
            GridLayout::new(row_height).with_columns(ColumnPolicy::Fixed(per_row)),
        );
        let mut cache = OffsetCache::new();
        for count in counts {
            let units = layout.unit_count(count, 0.0);
            let extent = layout.extent();
            let cached = cache
                .get_or_build(units, layout.fingerprint(0.0), |i| extent.size_of(i))
                .clone();
            prop_assert_eq!(cached, layout.build_offsets(units));
        }
    }
}
