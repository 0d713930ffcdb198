#![forbid(unsafe_code)]

//! Range math for windowed rendering.
//!
//! - [`OffsetTable`] - cumulative `[start, end)` spans and binary-searched
//!   visible ranges
//! - [`OffsetCache`] - rebuilds the table only when `(count, fingerprint)` changes
//! - [`ItemExtent`] - fixed, variable, or measured per-unit sizes
//! - [`Layout`] - list (one record per unit) or grid (rows of records)
//!
//! Nothing in this crate holds records or performs I/O.

pub mod cache;
pub mod extent;
pub mod fingerprint;
pub mod grid;
pub mod offsets;

pub use cache::OffsetCache;
pub use extent::{ItemExtent, MeasuredExtents, VariableExtent};
pub use grid::{ColumnPolicy, GridLayout, Layout};
pub use offsets::{OffsetTable, Span};
