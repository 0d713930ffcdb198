#![forbid(unsafe_code)]

//! Core: records, page numbers, errors, viewport signals, and the page-source
//! capability.
//!
//! Everything here is plain data plus one trait. The range math lives in
//! `pwin-layout`; the stateful engine lives in `pwin-runtime`.

pub mod error;
pub mod page;
pub mod record;
pub mod source;
pub mod viewport;

pub use error::{FetchError, FetchErrorKind, InvariantViolation};
pub use page::{Direction, Page, PageNumber};
pub use record::Record;
pub use source::PageSource;
pub use viewport::{Viewport, ViewportSignal, sanitize_extent};
