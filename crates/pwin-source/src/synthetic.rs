#![forbid(unsafe_code)]

//! Deterministic in-memory page source.
//!
//! Record `k` (zero-based, across pages) always has id `k` and the same
//! dimensions, so runs are reproducible. Clones share failure plans and the
//! fetch log, so a test can keep one handle while the loader owns another.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use pwin_core::{FetchError, PageNumber, PageSource, Record};
use tracing::trace;

const WIDTHS: [u32; 5] = [5000, 4000, 3000, 2500, 1800];
const HEIGHTS: [u32; 4] = [3333, 2667, 2000, 1200];

#[derive(Debug, Default)]
struct Shared {
    /// Page number to remaining injected failures.
    failures: BTreeMap<u32, usize>,
    fetches: Vec<u32>,
}

/// Generates records on demand.
#[derive(Debug, Clone, Default)]
pub struct SyntheticSource {
    total_pages: Option<u32>,
    latency: Duration,
    shared: Arc<Mutex<Shared>>,
}

impl SyntheticSource {
    /// Endless source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Source whose pages after `total_pages` are empty.
    #[must_use]
    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    /// Sleep this long inside every fetch.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next `times` fetches of `page` fail with status 503.
    #[must_use]
    pub fn failing(self, page: u32, times: usize) -> Self {
        self.fail_page(page, times);
        self
    }

    /// Add `times` injected failures for `page`.
    pub fn fail_page(&self, page: u32, times: usize) {
        *self.lock().failures.entry(page).or_default() += times;
    }

    /// Every fetched page number, in call order.
    #[must_use]
    pub fn fetch_log(&self) -> Vec<u32> {
        self.lock().fetches.clone()
    }

    /// Total fetches.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.lock().fetches.len()
    }

    /// Fetches of one page.
    #[must_use]
    pub fn fetches_of(&self, page: u32) -> usize {
        self.lock().fetches.iter().filter(|&&p| p == page).count()
    }

    /// The records page `page` yields for `page_size`, ignoring failures.
    #[must_use]
    pub fn records(&self, page: PageNumber, page_size: usize) -> Vec<Record> {
        if self.total_pages.is_some_and(|total| page.get() > total) {
            return Vec::new();
        }
        let first = (page.get() as usize - 1) * page_size;
        (first..first + page_size).map(record).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn record(k: usize) -> Record {
    let width = WIDTHS[k % WIDTHS.len()];
    let height = HEIGHTS[k % HEIGHTS.len()];
    Record::new(
        k.to_string(),
        width,
        height,
        format!("https://picsum.photos/id/{k}/{width}/{height}"),
    )
    .with_author(format!("Author {}", k % 17))
}

impl PageSource for SyntheticSource {
    fn fetch_page(&self, page: PageNumber, page_size: usize) -> Result<Vec<Record>, FetchError> {
        let inject = {
            let mut shared = self.lock();
            shared.fetches.push(page.get());
            match shared.failures.get_mut(&page.get()) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    true
                }
                _ => false,
            }
        };
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        if inject {
            trace!(page = page.get(), "injected failure");
            return Err(FetchError::status(page, 503));
        }
        let records = self.records(page, page_size);
        trace!(page = page.get(), len = records.len(), "synthetic page");
        Ok(records)
    }
}
