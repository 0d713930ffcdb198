#![forbid(unsafe_code)]

//! Stop signal shared between the loader and its in-flight fetch jobs.
//!
//! The loader keeps the [`StopTrigger`]; every job gets a clone of the
//! [`StopSignal`]. Jobs check the signal before fetching and again before
//! reporting, so results produced after teardown never reach the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Read side: checked by fetch jobs.
#[derive(Debug, Clone)]
pub struct StopSignal {
    inner: Arc<AtomicBool>,
}

impl StopSignal {
    /// Create a new (signal, trigger) pair.
    #[must_use]
    pub fn new() -> (Self, StopTrigger) {
        let inner = Arc::new(AtomicBool::new(false));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    /// Whether the trigger has fired.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}

/// Write side: owned by the loader.
#[derive(Debug)]
pub struct StopTrigger {
    inner: Arc<AtomicBool>,
}

impl StopTrigger {
    /// Fire the signal. Idempotent.
    pub fn stop(&self) {
        self.inner.store(true, Ordering::Release);
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}
