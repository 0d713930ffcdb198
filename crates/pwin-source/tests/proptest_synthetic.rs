#![forbid(unsafe_code)]

//! Property-based invariant tests for the synthetic source.
//!
//! 1. Determinism: independent sources yield identical records per (page, size).
//! 2. Ids are global indices: page `n` of size `s` covers `(n-1)*s..n*s`.
//! 3. Pages past the configured total are empty; pages within it are full.
//! 4. Every record has non-zero dimensions.
//! 5. Without injected failures, `fetch_page` returns `records` and logs the call.

use proptest::prelude::*;
use pwin_core::{PageNumber, PageSource};
use pwin_source::SyntheticSource;

fn page() -> impl Strategy<Value = PageNumber> {
    (1u32..=500).prop_map(|n| PageNumber::new(n).unwrap())
}

proptest! {
    #[test]
    fn same_page_same_records(p in page(), size in 0usize..40) {
        let a = SyntheticSource::new().records(p, size);
        let b = SyntheticSource::new().records(p, size);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn ids_are_global_indices(p in page(), size in 1usize..40) {
        let first = (p.get() as usize - 1) * size;
        let ids: Vec<String> = SyntheticSource::new()
            .records(p, size)
            .into_iter()
            .map(|r| r.id)
            .collect();
        let expected: Vec<String> = (first..first + size).map(|k| k.to_string()).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn total_pages_bounds_the_collection(total in 1u32..50, p in page(), size in 1usize..20) {
        let records = SyntheticSource::new().with_total_pages(total).records(p, size);
        if p.get() > total {
            prop_assert!(records.is_empty());
        } else {
            prop_assert_eq!(records.len(), size);
        }
    }

    #[test]
    fn dimensions_are_positive(p in page(), size in 1usize..40) {
        for record in SyntheticSource::new().records(p, size) {
            prop_assert!(record.width > 0 && record.height > 0);
        }
    }

    #[test]
    fn fetch_matches_records_and_is_logged(pages in prop::collection::vec(page(), 1..10), size in 1usize..10) {
        let source = SyntheticSource::new();
        for &p in &pages {
            let fetched = source.fetch_page(p, size).unwrap();
            prop_assert_eq!(fetched, source.records(p, size));
        }
        let log: Vec<u32> = pages.iter().map(|p| p.get()).collect();
        prop_assert_eq!(source.fetch_log(), log);
    }
}
