//! Background index jobs.
//!
//! Index-mutating jobs (build, update, delete) share one [`IndexLock`] so that at most one of
//! them runs at a time. Searches never take the lock; readers are reopened through the
//! index change listeners instead. The periodic update skips a tick when the lock is busy.

mod scheduler;

use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, TryLockError,
        mpsc::{self, RecvTimeoutError, Sender},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, info, warn};

pub use self::scheduler::{SearchOutcome, SearchScheduler};
use crate::{
    IndexError,
    indexer::{IndexStats, Indexer, ProgressReporter, SilentReporter},
};

/// Exclusive token held by every job that mutates the index.
#[derive(Debug, Clone, Default)]
pub struct IndexLock {
    /// The shared mutex.
    inner: Arc<Mutex<()>>,
}

impl IndexLock {
    /// Creates an unheld lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the lock is free and takes it.
    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the lock if nobody holds it.
    pub fn try_acquire(&self) -> Option<MutexGuard<'_, ()>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

/// Runs indexer operations under the index lock.
#[derive(Clone)]
pub struct IndexJobs {
    /// The indexer all jobs act on.
    indexer: Arc<Indexer>,
    /// Serializes mutations.
    lock: IndexLock,
}

impl IndexJobs {
    /// Wraps an indexer; register listeners on it before calling this.
    pub fn new(indexer: Indexer) -> Self {
        Self {
            indexer: Arc::new(indexer),
            lock: IndexLock::new(),
        }
    }

    /// The wrapped indexer.
    pub fn indexer(&self) -> &Indexer {
        &self.indexer
    }

    /// The lock mutations are serialized on.
    pub fn lock(&self) -> &IndexLock {
        &self.lock
    }

    /// Full index build.
    pub fn build<R: ProgressReporter>(&self, reporter: &mut R) -> Result<IndexStats, IndexError> {
        let _guard = self.lock.acquire();
        self.indexer.full_rebuild(reporter)
    }

    /// Incremental update.
    pub fn update<R: ProgressReporter>(&self, reporter: &mut R) -> Result<IndexStats, IndexError> {
        let _guard = self.lock.acquire();
        self.indexer.incremental_update(reporter)
    }

    /// Deletes the whole index.
    pub fn delete_index(&self) -> Result<(), IndexError> {
        let _guard = self.lock.acquire();
        self.indexer.delete_index()
    }

    /// Removes one file by indexed path.
    pub fn delete_file(&self, file_path: &str) -> Result<(), IndexError> {
        let _guard = self.lock.acquire();
        self.indexer.delete_file(file_path)
    }

    /// Removes a folder by indexed path.
    pub fn delete_folder(&self, folder: &str) -> Result<(), IndexError> {
        let _guard = self.lock.acquire();
        self.indexer.delete_folder(folder)
    }

    /// Removes a project.
    pub fn delete_project(&self, project: &str) -> Result<(), IndexError> {
        let _guard = self.lock.acquire();
        self.indexer.delete_project(project)
    }

    /// Starts the periodic update configured in `[index]`.
    ///
    /// Returns `None` when updates are disabled or the interval is zero.
    pub fn start_periodic_update(&self) -> Option<PeriodicUpdate> {
        let settings = &self.indexer.config().index;
        if !settings.update_enabled || settings.update_interval_ms == 0 {
            return None;
        }
        Some(self.spawn_periodic_update(Duration::from_millis(settings.update_interval_ms)))
    }

    /// Runs an incremental update every `interval` until stopped.
    pub fn spawn_periodic_update(&self, interval: Duration) -> PeriodicUpdate {
        let (stop, stopped) = mpsc::channel::<()>();
        let jobs = self.clone();
        let handle = thread::spawn(move || {
            loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                let Some(_guard) = jobs.lock.try_acquire() else {
                    debug!("index busy, skipping periodic update");
                    continue;
                };
                match jobs.indexer.incremental_update(&mut SilentReporter) {
                    Ok(stats) => debug!(changes = stats.total_changes(), "periodic update"),
                    Err(err) => warn!(error = %err, "periodic update failed"),
                }
            }
            debug!("periodic update stopped");
        });
        info!(interval_ms = interval.as_millis(), "periodic update started");
        PeriodicUpdate { stop, handle }
    }
}

/// Handle of a running periodic update.
pub struct PeriodicUpdate {
    /// Dropping or signalling this ends the loop.
    stop: Sender<()>,
    /// The update thread.
    handle: JoinHandle<()>,
}

impl PeriodicUpdate {
    /// Stops the loop and waits for a running update to finish.
    pub fn stop(self) {
        let Self { stop, handle } = self;
        drop(stop);
        if handle.join().is_err() {
            warn!("periodic update thread panicked");
        }
    }
}
