#![forbid(unsafe_code)]

//! Where fetch jobs run.
//!
//! A job fetches one page and sends the outcome back over the loader's
//! completion channel. Executors only decide *where* that happens; the
//! outcome is applied when the owner polls, never from inside the job.
//!
//! | Executor | Runs job | Use |
//! |----------|----------|-----|
//! | [`ThreadExecutor`] | on a new named thread | production |
//! | [`InlineExecutor`] | on the caller, immediately | blocking hosts, simple tests |
//! | [`QueuedExecutor`] | when the host calls `run_pending` | deterministic simulation |

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

/// A unit of background work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs fetch jobs.
pub trait Executor: Send {
    /// Run `job` somewhere. `name` identifies the job for diagnostics.
    ///
    /// # Errors
    /// Returns an error if the job could not be scheduled; the job is dropped.
    fn execute(&self, name: String, job: Job) -> io::Result<()>;
}

/// Spawns one named OS thread per job.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadExecutor;

impl Executor for ThreadExecutor {
    fn execute(&self, name: String, job: Job) -> io::Result<()> {
        thread::Builder::new().name(name).spawn(job).map(|_| ())
    }
}

/// Runs each job on the calling thread before returning.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, _name: String, job: Job) -> io::Result<()> {
        job();
        Ok(())
    }
}

/// Holds jobs until the host runs them.
///
/// Clones share one queue, so a test can keep a handle after moving the
/// executor into a loader.
#[derive(Clone, Default)]
pub struct QueuedExecutor {
    queue: Arc<Mutex<VecDeque<(String, Job)>>>,
}

impl QueuedExecutor {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<(String, Job)>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of queued jobs.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Names of queued jobs, oldest first.
    #[must_use]
    pub fn pending_names(&self) -> Vec<String> {
        self.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Run the oldest job. Returns `false` if the queue was empty.
    pub fn run_next(&self) -> bool {
        // Release the lock before running so the job may enqueue more work.
        let next = self.lock().pop_front();
        match next {
            Some((_, job)) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run the newest job first, to simulate out-of-order completion.
    pub fn run_latest(&self) -> bool {
        let next = self.lock().pop_back();
        match next {
            Some((_, job)) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run every queued job, including ones enqueued while running.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }
}

impl std::fmt::Debug for QueuedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedExecutor")
            .field("pending", &self.pending_names())
            .finish()
    }
}

impl Executor for QueuedExecutor {
    fn execute(&self, name: String, job: Job) -> io::Result<()> {
        self.lock().push_back((name, job));
        Ok(())
    }
}
