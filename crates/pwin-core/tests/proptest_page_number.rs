#![forbid(unsafe_code)]

//! Property-based invariant tests for page numbers.
//!
//! 1. `succ` then `pred` returns the starting page (below `u32::MAX`).
//! 2. `pred` then `succ` returns the starting page (above page 1).
//! 3. `pred` is `None` exactly at page 1, so no walk reaches page 0.
//! 4. Ordering agrees with the raw numbers.
//! 5. Construction succeeds exactly for non-zero values and round-trips `get`.

use proptest::prelude::*;
use pwin_core::{InvariantViolation, PageNumber};

fn page() -> impl Strategy<Value = PageNumber> {
    (1u32..=u32::MAX).prop_map(|n| PageNumber::new(n).unwrap())
}

proptest! {
    #[test]
    fn succ_then_pred_round_trips(p in page()) {
        match p.succ() {
            Some(next) => {
                prop_assert_eq!(next.get(), p.get() + 1);
                prop_assert_eq!(next.pred(), Some(p));
            }
            None => prop_assert_eq!(p.get(), u32::MAX),
        }
    }

    #[test]
    fn pred_then_succ_round_trips(p in page()) {
        match p.pred() {
            Some(prev) => {
                prop_assert_eq!(prev.get(), p.get() - 1);
                prop_assert_eq!(prev.succ(), Some(p));
            }
            None => prop_assert_eq!(p, PageNumber::FIRST),
        }
    }

    #[test]
    fn walking_back_stops_at_page_one(start in 1u32..200) {
        let mut p = PageNumber::new(start).unwrap();
        let mut steps = 0;
        while let Some(prev) = p.pred() {
            p = prev;
            steps += 1;
        }
        prop_assert_eq!(p, PageNumber::FIRST);
        prop_assert_eq!(steps, start - 1);
    }

    #[test]
    fn ordering_matches_raw_numbers(a in page(), b in page()) {
        prop_assert_eq!(a.cmp(&b), a.get().cmp(&b.get()));
    }

    #[test]
    fn construction_rejects_only_zero(n in any::<u32>()) {
        match PageNumber::new(n) {
            Ok(p) => {
                prop_assert_ne!(n, 0);
                prop_assert_eq!(u32::from(p), n);
                prop_assert_eq!(p.to_string(), n.to_string());
            }
            Err(err) => {
                prop_assert_eq!(n, 0);
                prop_assert_eq!(err, InvariantViolation::PageNumberZero);
            }
        }
    }
}
