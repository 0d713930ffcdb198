#![forbid(unsafe_code)]

//! De-duplicating page loader.
//!
//! Each page number moves through
//!
//! ```text
//! Unrequested ──request──▶ InFlight ──ok──▶ Loaded (terminal)
//!      ▲                      │
//!      └──────── Failed ◀─err─┘   (Failed is retryable)
//! ```
//!
//! At most one fetch per page number is in flight at any time. The loader is
//! the only component that flips `InFlight`/`Loaded`, and it does so only
//! through `&mut self`, so bursts of identical requests collapse into one
//! fetch. Requests for different pages may be in flight together; their
//! completions may arrive in any order because [`PageStore::merge`] places
//! records by page number.
//!
//! Fetches run on an [`Executor`] and report back over a channel. Nothing
//! is applied until the owner calls [`poll`](PaginatedLoader::poll) (or
//! [`wait`](PaginatedLoader::wait)), so a completion is processed as an
//! ordinary event, in arrival order, on the owner's thread.

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use pwin_core::{Direction, FetchError, Page, PageNumber, PageSource, Record};
use tracing::{debug, debug_span, info, warn};

use crate::cancel::{StopSignal, StopTrigger};
use crate::executor::{Executor, Job, ThreadExecutor};
use crate::page_store::{MergeOutcome, PageStore};

/// Where a page number is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Never requested.
    Unrequested,
    /// A fetch is running.
    InFlight,
    /// Merged into the store.
    Loaded,
    /// The last fetch failed; requesting again retries.
    Failed,
}

/// What [`PaginatedLoader::request_page`] did.
///
/// Everything except `Dispatched` is a silent no-op, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A fetch was started.
    Dispatched,
    /// The page is already in the store.
    AlreadyLoaded,
    /// A fetch for the page is already running.
    AlreadyInFlight,
    /// The page lies at or beyond the known end of the collection.
    Exhausted,
    /// The loader has been shut down.
    ShutDown,
    /// The executor refused the job; the failure was recorded as a fetch error.
    SpawnFailed,
}

impl RequestOutcome {
    /// Whether a fetch was started.
    #[must_use]
    pub fn is_dispatched(self) -> bool {
        self == Self::Dispatched
    }
}

/// Outcome of one fetch, as sent from the job to the loader.
#[derive(Debug)]
pub struct FetchCompletion {
    /// Page that was fetched.
    pub page: PageNumber,
    /// Direction it was requested in.
    pub direction: Direction,
    /// Records or the failure.
    pub result: Result<Vec<Record>, FetchError>,
}

/// What applying a completion did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedOutcome {
    /// Records were merged (or the page was a duplicate).
    Merged(MergeOutcome),
    /// The fetch failed with this message.
    Failed(String),
}

/// A completion that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Page number.
    pub page: PageNumber,
    /// Requested direction.
    pub direction: Direction,
    /// Effect on the store.
    pub outcome: AppliedOutcome,
}

impl Applied {
    /// Whether the fetch succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AppliedOutcome::Merged(_))
    }
}

/// Loading flags and the latest error.
#[derive(Debug, Clone, Default)]
pub struct LoadState {
    in_flight: BTreeMap<PageNumber, Direction>,
    failed: BTreeSet<PageNumber>,
    error: Option<String>,
}

impl LoadState {
    /// Whether any fetch is running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Whether a fetch for `page` is running.
    #[must_use]
    pub fn is_in_flight(&self, page: PageNumber) -> bool {
        self.in_flight.contains_key(&page)
    }

    /// Pages with a running fetch, ascending.
    pub fn in_flight(&self) -> impl Iterator<Item = PageNumber> + '_ {
        self.in_flight.keys().copied()
    }

    /// Pages whose last fetch failed, ascending.
    pub fn failed(&self) -> impl Iterator<Item = PageNumber> + '_ {
        self.failed.iter().copied()
    }

    /// Most recent failure message, cleared by the next success.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
    /// Fetch jobs handed to the executor.
    pub dispatched: u64,
    /// Completions merged into the store.
    pub merged: u64,
    /// Completions recorded as failures.
    pub failed: u64,
    /// Completions dropped after shutdown.
    pub discarded: u64,
}

/// Wraps a [`PageSource`] with de-duplication, ordering, and error capture.
pub struct PaginatedLoader {
    source: Arc<dyn PageSource>,
    executor: Box<dyn Executor>,
    page_size: usize,
    store: PageStore,
    state: LoadState,
    /// Lowest page known to be past the end of the collection.
    end_of_collection: Option<PageNumber>,
    tx: Sender<FetchCompletion>,
    rx: Receiver<FetchCompletion>,
    stop: StopSignal,
    trigger: StopTrigger,
    stats: LoaderStats,
}

impl PaginatedLoader {
    /// Create a loader that fetches on background threads.
    pub fn new<S>(source: S, page_size: usize) -> Self
    where
        S: PageSource + 'static,
    {
        Self::from_shared(Arc::new(source), page_size)
    }

    /// Create a loader over an already-shared source.
    #[must_use]
    pub fn from_shared(source: Arc<dyn PageSource>, page_size: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        let (stop, trigger) = StopSignal::new();
        Self {
            source,
            executor: Box::new(ThreadExecutor),
            page_size: page_size.max(1),
            store: PageStore::new(),
            state: LoadState::default(),
            end_of_collection: None,
            tx,
            rx,
            stop,
            trigger,
            stats: LoaderStats::default(),
        }
    }

    /// Run fetches on `executor` instead of background threads.
    #[must_use]
    pub fn with_executor<E>(mut self, executor: E) -> Self
    where
        E: Executor + 'static,
    {
        self.executor = Box::new(executor);
        self
    }

    /// Records requested per page.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The store. Read-only: only the loader merges.
    #[must_use]
    pub fn store(&self) -> &PageStore {
        &self.store
    }

    /// Loading flags and latest error.
    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Whether any fetch is running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Latest error message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Counters.
    #[must_use]
    pub fn stats(&self) -> LoaderStats {
        self.stats
    }

    /// Lowest page known to be past the end, once a forward page came back empty.
    #[must_use]
    pub fn end_of_collection(&self) -> Option<PageNumber> {
        self.end_of_collection
    }

    /// Whether `page` lies at or beyond the known end of the collection.
    #[must_use]
    pub fn is_exhausted(&self, page: PageNumber) -> bool {
        self.end_of_collection.is_some_and(|end| page >= end)
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.trigger.is_stopped()
    }

    /// Lifecycle state of `page`.
    #[must_use]
    pub fn status(&self, page: PageNumber) -> PageStatus {
        if self.store.has_page(page) {
            PageStatus::Loaded
        } else if self.state.is_in_flight(page) {
            PageStatus::InFlight
        } else if self.state.failed.contains(&page) {
            PageStatus::Failed
        } else {
            PageStatus::Unrequested
        }
    }

    /// Pages whose last fetch failed.
    #[must_use]
    pub fn failed_pages(&self) -> Vec<PageNumber> {
        self.state.failed().collect()
    }

    /// Start fetching `page` unless it is loaded, in flight, past the end,
    /// or the loader is shut down.
    pub fn request_page(&mut self, page: PageNumber, direction: Direction) -> RequestOutcome {
        if self.is_shut_down() {
            return RequestOutcome::ShutDown;
        }
        if self.store.has_page(page) {
            return RequestOutcome::AlreadyLoaded;
        }
        if self.state.is_in_flight(page) {
            return RequestOutcome::AlreadyInFlight;
        }
        if self.is_exhausted(page) {
            return RequestOutcome::Exhausted;
        }

        self.state.in_flight.insert(page, direction);
        let job = self.fetch_job(page, direction);
        match self.executor.execute(format!("pwin-fetch-{page}"), job) {
            Ok(()) => {
                self.stats.dispatched += 1;
                debug!(page = page.get(), %direction, "page fetch dispatched");
                RequestOutcome::Dispatched
            }
            Err(err) => {
                self.state.in_flight.remove(&page);
                let failure = FetchError::transport(page, format!("could not start fetch: {err}"));
                self.record_failure(page, &failure);
                RequestOutcome::SpawnFailed
            }
        }
    }

    fn fetch_job(&self, page: PageNumber, direction: Direction) -> Job {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let stop = self.stop.clone();
        let page_size = self.page_size;
        Box::new(move || {
            if stop.is_stopped() {
                return;
            }
            let span = debug_span!("pwin.fetch", page = page.get(), %direction);
            let _guard = span.enter();
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                source.fetch_page(page, page_size)
            }))
            .unwrap_or_else(|payload| {
                Err(FetchError::transport(
                    page,
                    format!("fetch panicked: {}", panic_message(payload.as_ref())),
                ))
            });
            if stop.is_stopped() {
                debug!("fetch finished after shutdown; result dropped");
                return;
            }
            // The receiver lives as long as the loader; a send error means it is gone.
            let _ = tx.send(FetchCompletion {
                page,
                direction,
                result,
            });
        })
    }

    /// Apply the next queued completion, if any, without blocking.
    pub fn poll_one(&mut self) -> Option<Applied> {
        while let Ok(completion) = self.rx.try_recv() {
            if let Some(applied) = self.apply(completion) {
                return Some(applied);
            }
        }
        None
    }

    /// Apply every queued completion without blocking.
    pub fn poll(&mut self) -> Vec<Applied> {
        std::iter::from_fn(|| self.poll_one()).collect()
    }

    /// Block up to `timeout` for one completion and apply it.
    pub fn wait_one(&mut self, timeout: Duration) -> Option<Applied> {
        if let Some(applied) = self.poll_one() {
            return Some(applied);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => self.apply(completion),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Block up to `timeout` for a completion, then apply everything queued.
    pub fn wait(&mut self, timeout: Duration) -> Vec<Applied> {
        let mut applied: Vec<Applied> = self.wait_one(timeout).into_iter().collect();
        applied.extend(self.poll());
        applied
    }

    /// Apply a completion. Returns `None` when it was discarded.
    pub fn apply(&mut self, completion: FetchCompletion) -> Option<Applied> {
        let FetchCompletion {
            page,
            direction,
            result,
        } = completion;

        if self.is_shut_down() {
            self.stats.discarded += 1;
            debug!(page = page.get(), "completion after shutdown discarded");
            return None;
        }
        if self.state.in_flight.remove(&page).is_none() {
            self.stats.discarded += 1;
            debug!(page = page.get(), "completion without matching request discarded");
            return None;
        }

        let outcome = match result {
            Ok(records) => {
                let empty = records.is_empty();
                let merged = self.store.merge(Page::new(page, records), direction);
                self.state.failed.remove(&page);
                self.state.error = None;
                self.stats.merged += 1;
                if empty && direction == Direction::Append {
                    let end = self.end_of_collection.map_or(page, |end| end.min(page));
                    self.end_of_collection = Some(end);
                    info!(page = page.get(), "end of collection reached");
                }
                AppliedOutcome::Merged(merged)
            }
            Err(err) => {
                self.record_failure(page, &err);
                AppliedOutcome::Failed(err.to_string())
            }
        };

        Some(Applied {
            page,
            direction,
            outcome,
        })
    }

    fn record_failure(&mut self, page: PageNumber, err: &FetchError) {
        warn!(page = page.get(), error = %err, "page fetch failed");
        self.state.failed.insert(page);
        self.state.error = Some(err.to_string());
        self.stats.failed += 1;
    }

    /// Stop accepting requests and drop results of fetches still running.
    ///
    /// In-flight fetches are not interrupted; their results are discarded.
    pub fn shutdown(&mut self) {
        if self.is_shut_down() {
            return;
        }
        self.trigger.stop();
        info!(
            in_flight = self.state.in_flight.len(),
            loaded_pages = self.store.page_count(),
            "loader shut down"
        );
        self.state.in_flight.clear();
    }
}

impl Drop for PaginatedLoader {
    fn drop(&mut self) {
        self.trigger.stop();
    }
}

impl std::fmt::Debug for PaginatedLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedLoader")
            .field("page_size", &self.page_size)
            .field("store", &self.store)
            .field("state", &self.state)
            .field("end_of_collection", &self.end_of_collection)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
