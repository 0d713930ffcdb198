#![forbid(unsafe_code)]

//! List and grid layouts.
//!
//! A layout maps records to *units*: in a list every record is one unit, in
//! a grid a unit is a row of up to `items_per_row` records. Offsets and
//! visible ranges are always computed over units; [`Layout::item_range`]
//! translates a unit range back to record indices.

use std::ops::Range;

use crate::extent::ItemExtent;
use crate::fingerprint::Fingerprint;
use crate::offsets::OffsetTable;

/// How many records share one row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnPolicy {
    /// Always `n` per row (clamped to at least 1).
    Fixed(usize),
    /// Pick by viewport cross size: the first step whose width bound is
    /// strictly greater than the cross size wins, else `otherwise`.
    Breakpoints {
        /// `(exclusive upper bound on cross size, items per row)`, ascending.
        steps: Vec<(f64, usize)>,
        /// Items per row beyond the last step.
        otherwise: usize,
    },
}

impl Default for ColumnPolicy {
    fn default() -> Self {
        Self::Breakpoints {
            steps: vec![(500.0, 2), (900.0, 3)],
            otherwise: 4,
        }
    }
}

impl ColumnPolicy {
    /// Items per row for a viewport `cross_size` wide. Never zero.
    #[must_use]
    pub fn columns_for(&self, cross_size: f64) -> usize {
        let n = match self {
            Self::Fixed(n) => *n,
            Self::Breakpoints { steps, otherwise } => steps
                .iter()
                .find(|(bound, _)| cross_size < *bound)
                .map_or(*otherwise, |(_, n)| *n),
        };
        n.max(1)
    }

    fn fingerprint(&self, fp: Fingerprint) -> Fingerprint {
        match self {
            Self::Fixed(n) => fp.u64(0).u64(*n as u64),
            Self::Breakpoints { steps, otherwise } => {
                let mut fp = fp.u64(1).u64(*otherwise as u64);
                for (bound, n) in steps {
                    fp = fp.f64(*bound).u64(*n as u64);
                }
                fp
            }
        }
    }
}

/// Rows of records, each row sized by `row_extent`.
#[derive(Debug, Clone)]
pub struct GridLayout {
    /// Size of each row.
    pub row_extent: ItemExtent,
    /// Items per row.
    pub columns: ColumnPolicy,
}

impl GridLayout {
    /// Fixed-height rows with responsive columns.
    #[must_use]
    pub fn new(row_height: f64) -> Self {
        Self {
            row_extent: ItemExtent::fixed(row_height),
            columns: ColumnPolicy::default(),
        }
    }

    /// Set the column policy.
    #[must_use]
    pub fn with_columns(mut self, columns: ColumnPolicy) -> Self {
        self.columns = columns;
        self
    }
}

/// Record-to-unit mapping plus unit sizing.
#[derive(Debug, Clone)]
pub enum Layout {
    /// One record per unit.
    List(ItemExtent),
    /// Rows of records.
    Grid(GridLayout),
}

impl Default for Layout {
    fn default() -> Self {
        Self::Grid(GridLayout::new(300.0))
    }
}

impl Layout {
    /// Records per unit for a viewport `cross_size` wide.
    #[must_use]
    pub fn items_per_unit(&self, cross_size: f64) -> usize {
        match self {
            Self::List(_) => 1,
            Self::Grid(grid) => grid.columns.columns_for(cross_size),
        }
    }

    /// Number of units needed for `item_count` records.
    #[must_use]
    pub fn unit_count(&self, item_count: usize, cross_size: f64) -> usize {
        item_count.div_ceil(self.items_per_unit(cross_size))
    }

    /// Unit sizing.
    #[must_use]
    pub fn extent(&self) -> &ItemExtent {
        match self {
            Self::List(extent) => extent,
            Self::Grid(grid) => &grid.row_extent,
        }
    }

    /// Mutable unit sizing.
    pub fn extent_mut(&mut self) -> &mut ItemExtent {
        match self {
            Self::List(extent) => extent,
            Self::Grid(grid) => &mut grid.row_extent,
        }
    }

    /// Hash of everything that changes unit offsets apart from the count.
    ///
    /// Includes the items-per-unit resolved for `cross_size`, so a resize that
    /// crosses a breakpoint invalidates memoized offsets while one that does
    /// not leaves them alone.
    #[must_use]
    pub fn fingerprint(&self, cross_size: f64) -> u64 {
        let fp = Fingerprint::new()
            .u64(self.extent().fingerprint())
            .u64(self.items_per_unit(cross_size) as u64);
        match self {
            Self::List(_) => fp.u64(0).finish(),
            Self::Grid(grid) => grid.columns.fingerprint(fp.u64(1)).finish(),
        }
    }

    /// Build offsets for `unit_count` units.
    #[must_use]
    pub fn build_offsets(&self, unit_count: usize) -> OffsetTable {
        let extent = self.extent();
        OffsetTable::build(unit_count, |i| extent.size_of(i))
    }

    /// Record indices covered by `units`, clamped to `item_count`.
    #[must_use]
    pub fn item_range(
        &self,
        units: Range<usize>,
        cross_size: f64,
        item_count: usize,
    ) -> Range<usize> {
        let per = self.items_per_unit(cross_size);
        let start = units.start.saturating_mul(per).min(item_count);
        let end = units.end.saturating_mul(per).min(item_count);
        start..end
    }
}
