#![forbid(unsafe_code)]

//! Concrete [`PageSource`](pwin_core::PageSource) implementations.
//!
//! - [`SyntheticSource`] - deterministic records with optional failure
//!   injection and latency, for tests, benchmarks, and offline demos
//! - [`PicsumSource`] - the picsum.photos listing endpoint (feature `picsum`)

pub mod synthetic;

#[cfg(feature = "picsum")]
pub mod picsum;

pub use synthetic::SyntheticSource;

#[cfg(feature = "picsum")]
pub use picsum::{PicsumPhoto, PicsumSource, decode_listing};
