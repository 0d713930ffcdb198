#![forbid(unsafe_code)]

//! Per-unit sizing strategies.

use std::fmt;
use std::sync::Arc;

use pwin_core::sanitize_extent;

use crate::fingerprint::Fingerprint;

/// Sizing function shared between layouts.
pub type SizeFn = Arc<dyn Fn(usize) -> f64 + Send + Sync>;

/// How large each unit (record or row) is along the scroll axis.
#[derive(Clone)]
pub enum ItemExtent {
    /// Every unit has the same size.
    Fixed(f64),
    /// Size computed per index by a caller-supplied function.
    Variable(VariableExtent),
    /// Estimated size refined by measurements.
    Measured(MeasuredExtents),
}

impl ItemExtent {
    /// Constant size.
    #[must_use]
    pub fn fixed(size: f64) -> Self {
        Self::Fixed(size)
    }

    /// Variable size.
    ///
    /// `fingerprint` must change whenever `size_of` would return different
    /// values; it is the only way offset memoization notices the change.
    #[must_use]
    pub fn variable<F>(fingerprint: u64, size_of: F) -> Self
    where
        F: Fn(usize) -> f64 + Send + Sync + 'static,
    {
        Self::Variable(VariableExtent {
            size_of: Arc::new(size_of),
            fingerprint,
        })
    }

    /// Estimated size, refined per index with [`MeasuredExtents::set`].
    #[must_use]
    pub fn measured(estimate: f64) -> Self {
        Self::Measured(MeasuredExtents::new(estimate))
    }

    /// Size of unit `index`, never negative.
    #[must_use]
    pub fn size_of(&self, index: usize) -> f64 {
        let raw = match self {
            Self::Fixed(size) => *size,
            Self::Variable(v) => (v.size_of)(index),
            Self::Measured(m) => m.get(index),
        };
        sanitize_extent(raw)
    }

    /// Hash of everything that influences [`size_of`](Self::size_of).
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        match self {
            Self::Fixed(size) => Fingerprint::new().u64(0).f64(*size).finish(),
            Self::Variable(v) => Fingerprint::new().u64(1).u64(v.fingerprint).finish(),
            Self::Measured(m) => Fingerprint::new()
                .u64(2)
                .f64(m.estimate)
                .u64(m.generation)
                .finish(),
        }
    }

    /// Measured sizes, when this strategy uses them.
    pub fn measured_mut(&mut self) -> Option<&mut MeasuredExtents> {
        match self {
            Self::Measured(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Debug for ItemExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(size) => f.debug_tuple("Fixed").field(size).finish(),
            Self::Variable(v) => f
                .debug_struct("Variable")
                .field("fingerprint", &v.fingerprint)
                .finish_non_exhaustive(),
            Self::Measured(m) => f.debug_tuple("Measured").field(m).finish(),
        }
    }
}

/// A sizing function plus the fingerprint that identifies it.
#[derive(Clone)]
pub struct VariableExtent {
    size_of: SizeFn,
    fingerprint: u64,
}

impl VariableExtent {
    /// Caller-supplied fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

/// Estimated sizes refined by measurement.
///
/// Unmeasured indices report the estimate. Every change bumps the
/// generation, which feeds the fingerprint, so cached offsets are rebuilt
/// exactly when a measurement actually differs from what was known.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredExtents {
    sizes: Vec<Option<f64>>,
    estimate: f64,
    generation: u64,
}

impl MeasuredExtents {
    /// Create with a default estimate for unmeasured indices.
    #[must_use]
    pub fn new(estimate: f64) -> Self {
        Self {
            sizes: Vec::new(),
            estimate: sanitize_extent(estimate),
            generation: 0,
        }
    }

    /// Size for `index`, falling back to the estimate.
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        self.sizes
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(self.estimate)
    }

    /// Whether `index` has a measurement.
    #[must_use]
    pub fn is_measured(&self, index: usize) -> bool {
        matches!(self.sizes.get(index), Some(Some(_)))
    }

    /// Record a measurement. Returns `true` if it changed anything.
    ///
    /// Callers bound `index` by the unit count; `usize::MAX` is ignored.
    pub fn set(&mut self, index: usize, size: f64) -> bool {
        let size = sanitize_extent(size);
        if self.sizes.get(index).copied().flatten() == Some(size) {
            return false;
        }
        let Some(needed) = index.checked_add(1) else {
            return false;
        };
        if needed > self.sizes.len() {
            self.sizes.resize(needed, None);
        }
        self.sizes[index] = Some(size);
        self.generation = self.generation.wrapping_add(1);
        true
    }

    /// Shift measurements at or after `at` back by `count` unmeasured slots,
    /// so they stay with their units after units were inserted at `at`.
    pub fn insert(&mut self, at: usize, count: usize) {
        if count == 0 || at >= self.sizes.len() {
            return;
        }
        let moved = self.sizes[at..].iter().any(Option::is_some);
        let tail = self.sizes.split_off(at);
        self.sizes.resize(at + count, None);
        self.sizes.extend(tail);
        if moved {
            self.generation = self.generation.wrapping_add(1);
        }
    }

    /// Forget measurements at or after `at`.
    pub fn truncate(&mut self, at: usize) {
        if at >= self.sizes.len() {
            return;
        }
        if self.sizes[at..].iter().any(Option::is_some) {
            self.generation = self.generation.wrapping_add(1);
        }
        self.sizes.truncate(at);
    }

    /// Forget all measurements.
    pub fn clear(&mut self) {
        if self.sizes.iter().any(Option::is_some) {
            self.generation = self.generation.wrapping_add(1);
        }
        self.sizes.clear();
    }

    /// Number of measured indices.
    #[must_use]
    pub fn measured_count(&self) -> usize {
        self.sizes.iter().filter(|s| s.is_some()).count()
    }

    /// Bumped on every effective change.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
