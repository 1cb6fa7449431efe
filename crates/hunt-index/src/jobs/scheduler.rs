//! Debounced search scheduling.
//!
//! Every keystroke schedules a new search. Scheduling cancels the query of the previous
//! request, waits out the typing delay and only then runs the search if nothing newer came
//! in, so the last keystroke wins. Finished searches arrive on a channel.

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::debug;

use crate::{
    IndexError,
    result::SearchResult,
    search::{CancelFlag, SearchQuery, Searcher},
};

/// A finished search.
pub struct SearchOutcome {
    /// The query, with exact and fuzzy flags describing the attempt that produced the result.
    pub query: SearchQuery,
    /// What the search produced.
    pub result: Result<Option<SearchResult>, IndexError>,
}

/// Runs searches in the background, one current query at a time.
pub struct SearchScheduler {
    /// Shared searcher.
    searcher: Arc<Searcher>,
    /// Flag of the most recently scheduled query.
    current: Mutex<Option<CancelFlag>>,
    /// Delivery channel.
    sender: Sender<SearchOutcome>,
}

impl SearchScheduler {
    /// Creates a scheduler and the receiving end of its results.
    pub fn new(searcher: Arc<Searcher>) -> (Self, Receiver<SearchOutcome>) {
        let (sender, receiver) = mpsc::channel();
        let scheduler = Self {
            searcher,
            current: Mutex::new(None),
            sender,
        };
        (scheduler, receiver)
    }

    /// Schedules `query` to run after `delay`, superseding any earlier query.
    ///
    /// Nothing is delivered for a query that gets canceled before it finishes.
    pub fn schedule(&self, mut query: SearchQuery, delay: Duration) -> JoinHandle<()> {
        let flag = query.renew_cancel_flag();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(flag);
        if let Some(previous) = previous {
            previous.cancel();
        }

        let searcher = Arc::clone(&self.searcher);
        let sender = self.sender.clone();
        thread::spawn(move || {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            if query.is_canceled() {
                debug!(query = query.search_string(), "superseded before start");
                return;
            }
            let result = searcher.search(&mut query);
            if query.is_canceled() {
                debug!(query = query.search_string(), "superseded while running");
                return;
            }
            if sender.send(SearchOutcome { query, result }).is_err() {
                debug!("search results no longer received");
            }
        })
    }

    /// Cancels the current query, if any.
    pub fn cancel(&self) {
        if let Some(flag) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            flag.cancel();
        }
    }
}
