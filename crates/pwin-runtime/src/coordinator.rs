#![forbid(unsafe_code)]

//! Window coordinator.
//!
//! Glues viewport signals to range computation and to load-more / load-previous
//! decisions. Everything here runs on the owner's thread: signals and fetch
//! completions are processed one at a time, in the order the host delivers
//! them.
//!
//! # Per-signal pipeline
//!
//! ```text
//! scroll/resize ─▶ dedupe ─▶ offsets (memoized) ─▶ visible range ─▶ WindowState
//!                                                               └─▶ edge checks ─▶ loader
//! completion    ─▶ anchor ─▶ merge ─▶ bootstrap ─▶ recompute ─▶ edge checks
//! ```
//!
//! # Edge triggers
//!
//! With `remaining = total_extent - (scroll_offset + viewport_size)`:
//!
//! - `remaining <= threshold` requests the page after the highest loaded one.
//! - `scroll_offset <= threshold` requests the page before the lowest loaded
//!   one, never below page 1.
//!
//! Both checks are skipped while any fetch is running, and both may fire on
//! the same signal. A failed fetch is not retried by the completion that
//! reported it; the next signal re-runs the checks and re-requests it.

use std::ops::Range;
use std::time::Duration;

use pwin_core::{
    Direction, InvariantViolation, PageNumber, PageSource, Record, Viewport, ViewportSignal,
    sanitize_extent,
};
use pwin_layout::{Layout, OffsetCache, OffsetTable};
use tracing::{debug, info, trace};

use crate::config::WindowConfig;
use crate::loader::{Applied, AppliedOutcome, PaginatedLoader};
use crate::page_store::{MergeOutcome, PageStore};

/// The active window, recomputed on every processed signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowState {
    /// Active layout units (rows in a grid), overscan included.
    pub units: Range<usize>,
    /// Record indices covered by `units`.
    pub items: Range<usize>,
    /// Extent of all loaded content.
    pub total_extent: f64,
    /// Scroll offset the window was computed for.
    pub scroll_offset: f64,
    /// Viewport size the window was computed for.
    pub viewport_size: f64,
    /// Offset of the first active unit from the top of the content.
    pub window_offset: f64,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSnapshot<'a> {
    /// Records in the active window.
    pub visible_items: &'a [Record],
    /// Where the first of them sits, measured from the top of the content.
    pub window_offset_from_top: f64,
    /// Extent of all loaded content.
    pub total_extent: f64,
    /// Whether any fetch is running.
    pub is_loading: bool,
    /// Latest fetch failure.
    pub error: Option<&'a str>,
}

/// One active layout unit with its records.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRow<'a> {
    /// Unit index.
    pub index: usize,
    /// Offset of the unit's leading edge.
    pub top: f64,
    /// Unit size along the scroll axis.
    pub extent: f64,
    /// Index of the unit's first record.
    pub first_item: usize,
    /// The unit's records; the last row of a grid may be short.
    pub items: &'a [Record],
}

#[derive(Debug, Clone, Copy)]
struct Bootstrap {
    awaiting: PageNumber,
    remaining: usize,
}

/// First record at the scroll offset and how far into its unit the offset lies.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    item: usize,
    delta: f64,
}

/// Owns the loader and turns viewport signals into a window plus fetches.
#[derive(Debug)]
pub struct WindowCoordinator {
    loader: PaginatedLoader,
    config: WindowConfig,
    layout: Layout,
    offsets: OffsetCache,
    viewport: Viewport,
    last_scroll: Option<f64>,
    window: WindowState,
    bootstrap: Option<Bootstrap>,
    mounted: bool,
    scroll_correction: f64,
    recomputes: u64,
}

impl WindowCoordinator {
    /// Coordinator fetching from `source` on background threads.
    pub fn new<S>(source: S, config: WindowConfig) -> Self
    where
        S: PageSource + 'static,
    {
        let loader = PaginatedLoader::new(source, config.page_size);
        Self::with_loader(loader, config)
    }

    /// Coordinator around a prepared loader.
    ///
    /// The loader's own page size wins over `config.page_size`.
    #[must_use]
    pub fn with_loader(loader: PaginatedLoader, config: WindowConfig) -> Self {
        let viewport = Viewport::new(
            sanitize_extent(config.viewport_size),
            sanitize_extent(config.cross_size),
        );
        let mut coordinator = Self {
            loader,
            config,
            layout: Layout::default(),
            offsets: OffsetCache::new(),
            viewport,
            last_scroll: None,
            window: WindowState::default(),
            bootstrap: None,
            mounted: false,
            scroll_correction: 0.0,
            recomputes: 0,
        };
        coordinator.recompute();
        coordinator
    }

    /// Replace the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.set_layout(layout);
        self
    }

    /// Replace the layout and recompute the window.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
        // A new variable sizing function may reuse an old fingerprint.
        self.offsets.invalidate();
        self.recompute();
    }

    /// Start the initial load: `initial_pages` pages from `start_page`,
    /// each requested only after the previous one resolved.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        let start = self.config.start_page;
        info!(
            start_page = start.get(),
            initial_pages = self.config.initial_pages,
            "window mounted"
        );
        if self.config.initial_pages > 0
            && self
                .loader
                .request_page(start, Direction::Append)
                .is_dispatched()
        {
            self.bootstrap = Some(Bootstrap {
                awaiting: start,
                remaining: self.config.initial_pages - 1,
            });
        }
        self.refresh();
    }

    /// Stop fetching. Results still in flight are discarded when they land.
    pub fn teardown(&mut self) {
        self.bootstrap = None;
        self.loader.shutdown();
        info!(items = self.loader.store().len(), "window torn down");
    }

    /// Process one viewport signal. Returns `false` if it changed nothing.
    pub fn handle(&mut self, signal: ViewportSignal) -> bool {
        match signal {
            ViewportSignal::Scroll { offset } => self.on_scroll(offset),
            ViewportSignal::Resize { size, cross_size } => self.on_resize(size, cross_size),
        }
    }

    /// Scroll offset changed. An offset equal to the previous one is dropped.
    pub fn on_scroll(&mut self, offset: f64) -> bool {
        let offset = sanitize_extent(offset);
        if self.last_scroll == Some(offset) {
            trace!(offset, "duplicate scroll signal dropped");
            return false;
        }
        self.last_scroll = Some(offset);
        self.viewport.scroll_offset = offset;
        self.refresh();
        true
    }

    /// Viewport resized. Identical sizes are dropped.
    pub fn on_resize(&mut self, size: f64, cross_size: f64) -> bool {
        let size = sanitize_extent(size);
        let cross_size = sanitize_extent(cross_size);
        if self.viewport.size == size && self.viewport.cross_size == cross_size {
            return false;
        }
        let per_unit = self.layout.items_per_unit(self.viewport.cross_size);
        if self.layout.items_per_unit(cross_size) != per_unit {
            // Rows reflow; per-row measurements are stale.
            if let Some(measured) = self.layout.extent_mut().measured_mut() {
                measured.clear();
            }
        }
        self.viewport.size = size;
        self.viewport.cross_size = cross_size;
        self.refresh();
        true
    }

    /// Apply every completed fetch without blocking.
    pub fn poll(&mut self) -> Vec<Applied> {
        let mut applied = Vec::new();
        self.drain(&mut applied);
        self.after_completions(&applied);
        applied
    }

    /// Block up to `timeout` for a fetch to complete, then apply everything
    /// that has completed.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> Vec<Applied> {
        let mut applied = Vec::new();
        let anchor = self.anchor();
        if let Some(done) = self.loader.wait_one(timeout) {
            self.absorb(&done, anchor);
            applied.push(done);
            self.drain(&mut applied);
        }
        self.after_completions(&applied);
        applied
    }

    /// Re-request every page whose last fetch failed. Returns how many were dispatched.
    pub fn retry(&mut self) -> usize {
        let min = self.loader.store().min_page();
        let mut dispatched = 0;
        for page in self.loader.failed_pages() {
            let direction = match min {
                Some(min) if page < min => Direction::Prepend,
                _ => Direction::Append,
            };
            if self.loader.request_page(page, direction).is_dispatched() {
                dispatched += 1;
            }
        }
        debug!(dispatched, "retry requested");
        dispatched
    }

    /// Record a measured size for unit `index`.
    ///
    /// Returns whether the size changed.
    ///
    /// # Errors
    /// [`InvariantViolation::NotMeasured`] unless the layout uses measured extents;
    /// [`InvariantViolation::IndexOutOfRange`] unless `index` is a loaded unit.
    pub fn measure(&mut self, index: usize, size: f64) -> Result<bool, InvariantViolation> {
        let len = self
            .layout
            .unit_count(self.loader.store().len(), self.viewport.cross_size);
        let measured = self
            .layout
            .extent_mut()
            .measured_mut()
            .ok_or(InvariantViolation::NotMeasured)?;
        if index >= len {
            return Err(InvariantViolation::IndexOutOfRange { index, len });
        }
        let changed = measured.set(index, size);
        if changed {
            self.recompute();
        }
        Ok(changed)
    }

    /// Scroll adjustment accumulated from pages inserted above the viewport
    /// since the last call. The host should add it to its own scroll position.
    pub fn take_scroll_correction(&mut self) -> f64 {
        std::mem::take(&mut self.scroll_correction)
    }

    /// Current window.
    #[must_use]
    pub fn window(&self) -> &WindowState {
        &self.window
    }

    /// Records in the current window.
    #[must_use]
    pub fn visible_items(&self) -> &[Record] {
        self.loader
            .store()
            .items()
            .get(self.window.items.clone())
            .unwrap_or(&[])
    }

    /// Active units with their positions and records.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<VisibleRow<'_>> {
        let table = self.offsets.table();
        let per_unit = self.layout.items_per_unit(self.viewport.cross_size);
        let items = self.loader.store().items();
        self.window
            .units
            .clone()
            .filter_map(|index| {
                let span = table.span(index)?;
                let first_item = index * per_unit;
                let last = (first_item + per_unit).min(items.len());
                Some(VisibleRow {
                    index,
                    top: span.start,
                    extent: span.size(),
                    first_item,
                    items: items.get(first_item..last)?,
                })
            })
            .collect()
    }

    /// Everything the presentation layer needs.
    #[must_use]
    pub fn snapshot(&self) -> WindowSnapshot<'_> {
        WindowSnapshot {
            visible_items: self.visible_items(),
            window_offset_from_top: self.window.window_offset,
            total_extent: self.window.total_extent,
            is_loading: self.loader.is_loading(),
            error: self.loader.error(),
        }
    }

    /// Viewport the window was last computed for.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Current layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The loader, for load state and stats.
    #[must_use]
    pub fn loader(&self) -> &PaginatedLoader {
        &self.loader
    }

    /// Loaded records in page order.
    #[must_use]
    pub fn store(&self) -> &PageStore {
        self.loader.store()
    }

    /// Whether [`mount`](Self::mount) has run.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Times the offset table was rebuilt.
    #[must_use]
    pub fn offset_rebuilds(&self) -> u64 {
        self.offsets.rebuilds()
    }

    /// Times the window was recomputed.
    #[must_use]
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }

    fn refresh(&mut self) {
        self.recompute();
        self.check_edges();
    }

    fn drain(&mut self, applied: &mut Vec<Applied>) {
        loop {
            let anchor = self.anchor();
            let Some(done) = self.loader.poll_one() else {
                break;
            };
            self.absorb(&done, anchor);
            applied.push(done);
        }
    }

    fn after_completions(&mut self, applied: &[Applied]) {
        if applied.is_empty() {
            return;
        }
        self.recompute();
        if applied.iter().any(Applied::is_success) {
            self.check_edges();
        }
    }

    fn absorb(&mut self, applied: &Applied, anchor: Option<Anchor>) {
        if let AppliedOutcome::Merged(MergeOutcome::Merged { inserted_at, len }) =
            applied.outcome
        {
            self.shift_measurements(inserted_at, len);
            if let Some(anchor) = anchor {
                self.reanchor(anchor, inserted_at, len);
            }
        }
        self.advance_bootstrap(applied);
    }

    /// Keep measured sizes attached to their units after `len` records were
    /// inserted at `inserted_at`.
    fn shift_measurements(&mut self, inserted_at: usize, len: usize) {
        let per_unit = self.layout.items_per_unit(self.viewport.cross_size);
        let Some(measured) = self.layout.extent_mut().measured_mut() else {
            return;
        };
        let at = inserted_at / per_unit;
        if inserted_at % per_unit == 0 && len % per_unit == 0 {
            measured.insert(at, len / per_unit);
        } else {
            // Units from `at` on now hold different records.
            measured.truncate(at);
        }
    }

    fn advance_bootstrap(&mut self, applied: &Applied) {
        let Some(boot) = self.bootstrap else {
            return;
        };
        if applied.page != boot.awaiting {
            return;
        }
        self.bootstrap = None;
        if !applied.is_success() || boot.remaining == 0 {
            return;
        }
        let Some(next) = boot.awaiting.succ() else {
            return;
        };
        if self
            .loader
            .request_page(next, Direction::Append)
            .is_dispatched()
        {
            self.bootstrap = Some(Bootstrap {
                awaiting: next,
                remaining: boot.remaining - 1,
            });
        }
    }

    /// Offsets for the current store, layout, and cross size.
    fn offsets(&mut self) -> &OffsetTable {
        let cross = self.viewport.cross_size;
        let unit_count = self.layout.unit_count(self.loader.store().len(), cross);
        let fingerprint = self.layout.fingerprint(cross);
        let extent = self.layout.extent();
        self.offsets
            .get_or_build(unit_count, fingerprint, |i| extent.size_of(i))
    }

    fn anchor(&mut self) -> Option<Anchor> {
        if self.loader.store().is_empty() {
            return None;
        }
        let scroll = self.viewport.scroll_offset;
        let per_unit = self.layout.items_per_unit(self.viewport.cross_size);
        let table = self.offsets();
        let unit = table.index_at(scroll)?;
        let top = table.span(unit)?.start;
        Some(Anchor {
            item: unit * per_unit,
            delta: scroll - top,
        })
    }

    /// Keep the anchored record in place after `len` records were inserted
    /// at `inserted_at`.
    fn reanchor(&mut self, anchor: Anchor, inserted_at: usize, len: usize) {
        if len == 0 || inserted_at > anchor.item {
            return;
        }
        let item = anchor.item + len;
        let per_unit = self.layout.items_per_unit(self.viewport.cross_size);
        let Some(top) = self.offsets().span(item / per_unit).map(|s| s.start) else {
            return;
        };
        let offset = top + anchor.delta;
        let shift = offset - self.viewport.scroll_offset;
        self.viewport.scroll_offset = offset;
        self.last_scroll = Some(offset);
        self.scroll_correction += shift;
        debug!(shift, offset, "scroll re-anchored after insert above viewport");
    }

    fn recompute(&mut self) {
        let scroll = self.viewport.scroll_offset;
        let size = self.viewport.size;
        let overscan = self.config.overscan;
        let table = self.offsets();
        let units = table.visible_range(scroll, size, overscan);
        let window_offset = table.span(units.start).map_or(0.0, |s| s.start);
        let total_extent = table.total_extent();

        let items = self.layout.item_range(
            units.clone(),
            self.viewport.cross_size,
            self.loader.store().len(),
        );
        self.window = WindowState {
            units,
            items,
            total_extent,
            scroll_offset: scroll,
            viewport_size: size,
            window_offset,
        };
        self.recomputes += 1;
        trace!(
            units = ?self.window.units,
            items = ?self.window.items,
            total_extent,
            "window recomputed"
        );
    }

    fn check_edges(&mut self) {
        if !self.mounted || self.loader.is_loading() || self.loader.is_shut_down() {
            return;
        }
        let scroll = self.viewport.scroll_offset;
        let threshold = self.config.load_more_threshold;
        let remaining = self.window.total_extent - (scroll + self.viewport.size);
        let store = self.loader.store();
        let (min, max) = (store.min_page(), store.max_page());

        if remaining <= threshold {
            let next = match max {
                Some(max) => max.succ(),
                None => Some(self.config.start_page),
            };
            if let Some(next) = next {
                let outcome = self.loader.request_page(next, Direction::Append);
                debug!(page = next.get(), ?outcome, remaining, "forward edge reached");
            }
        }
        if scroll <= threshold {
            if let Some(prev) = min.and_then(PageNumber::pred) {
                let outcome = self.loader.request_page(prev, Direction::Prepend);
                debug!(page = prev.get(), ?outcome, scroll, "backward edge reached");
            }
        }
    }
}
