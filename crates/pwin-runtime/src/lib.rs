#![forbid(unsafe_code)]

//! pwin Runtime
//!
//! The stateful half of the windowing engine: it owns fetched records, drives
//! fetches, and turns viewport signals into an active window.
//!
//! # Key Components
//!
//! - [`PageStore`] - records keyed by page, flattened in page order
//! - [`PaginatedLoader`] - at most one fetch per page, completions applied on poll
//! - [`WindowCoordinator`] - viewport signals to visible range and edge-triggered fetches
//! - [`WindowConfig`] - tuning with environment overrides
//! - [`Executor`] - where fetch jobs run (threads, inline, or a deterministic queue)
//!
//! # How it fits in the system
//! Range math comes from `pwin-layout`; data types and the [`PageSource`]
//! capability come from `pwin-core`. A host feeds [`ViewportSignal`]s in,
//! calls [`WindowCoordinator::poll`] when convenient, and renders
//! [`WindowCoordinator::snapshot`].
//!
//! [`PageSource`]: pwin_core::PageSource
//! [`ViewportSignal`]: pwin_core::ViewportSignal

pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod executor;
pub mod loader;
pub mod page_store;

pub use cancel::{StopSignal, StopTrigger};
pub use config::WindowConfig;
pub use coordinator::{VisibleRow, WindowCoordinator, WindowSnapshot, WindowState};
pub use executor::{Executor, InlineExecutor, Job, QueuedExecutor, ThreadExecutor};
pub use loader::{
    Applied, AppliedOutcome, FetchCompletion, LoadState, LoaderStats, PageStatus,
    PaginatedLoader, RequestOutcome,
};
pub use page_store::{MergeOutcome, PageStore};
