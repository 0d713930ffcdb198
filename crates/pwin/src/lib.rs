#![forbid(unsafe_code)]

//! pwin public facade crate.
//!
//! Re-exports the common types from the internal crates and offers a small
//! prelude. A typical host:
//!
//! ```
//! use pwin::prelude::*;
//!
//! let source = |page: PageNumber, size: usize| -> std::result::Result<Vec<Record>, FetchError> {
//!     Ok((0..size)
//!         .map(|i| Record::new(format!("{page}-{i}"), 400, 300, ""))
//!         .collect())
//! };
//! let loader = PaginatedLoader::new(source, 20).with_executor(InlineExecutor);
//! let mut window = WindowCoordinator::with_loader(loader, WindowConfig::default());
//! window.mount();
//! window.poll();
//! window.handle(ViewportSignal::Scroll { offset: 120.0 });
//! assert!(!window.snapshot().visible_items.is_empty());
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use pwin_core::{
    Direction, FetchError, FetchErrorKind, InvariantViolation, Page, PageNumber, PageSource,
    Record, Viewport, ViewportSignal,
};

// --- Layout re-exports -----------------------------------------------------

pub use pwin_layout::{
    ColumnPolicy, GridLayout, ItemExtent, Layout, MeasuredExtents, OffsetCache, OffsetTable, Span,
};

// --- Runtime re-exports ----------------------------------------------------

pub use pwin_runtime::{
    Applied, Executor, InlineExecutor, LoadState, LoaderStats, PageStatus, PageStore,
    PaginatedLoader, QueuedExecutor, RequestOutcome, ThreadExecutor, VisibleRow, WindowConfig,
    WindowCoordinator, WindowSnapshot, WindowState,
};

// --- Source re-exports -----------------------------------------------------

#[cfg(feature = "sources")]
pub use pwin_source::SyntheticSource;

#[cfg(feature = "picsum")]
pub use pwin_source::PicsumSource;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for pwin hosts.
#[derive(Debug)]
pub enum Error {
    /// A page could not be fetched.
    Fetch(FetchError),
    /// A caller broke a precondition.
    Invariant(InvariantViolation),
    /// I/O failure, e.g. starting a worker thread.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "{err}"),
            Self::Invariant(err) => write!(f, "invariant violated: {err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            Self::Invariant(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Self::Fetch(err)
    }
}

impl From<InvariantViolation> for Error {
    fn from(err: InvariantViolation) -> Self {
        Self::Invariant(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Standard result type for pwin APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Direction, Error, FetchError, InlineExecutor, Layout, PageNumber, PageSource,
        PaginatedLoader, Record, Result, ViewportSignal, WindowConfig, WindowCoordinator,
    };

    pub use crate::{core, layout, runtime};
}

pub use pwin_core as core;
pub use pwin_layout as layout;
pub use pwin_runtime as runtime;

#[cfg(feature = "sources")]
pub use pwin_source as source;
