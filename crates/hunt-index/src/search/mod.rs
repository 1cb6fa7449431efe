//! Search execution for the hunt index.
//!
//! Provides the [`Searcher`] struct for querying the index and retrieving results.
//!
//! # Search Algorithm
//!
//! A search runs up to three attempts, stopping at the first that finds anything:
//!
//! 1. **Exact**: the query text as typed, analyzed coarsely, plus a file-name match for a
//!    single term. Skipped when the request starts out fuzzy or non-exact.
//!
//! 2. **Split**: the exact sub-query (boosted) OR the query analyzed by the code
//!    tokenizer chain, which splits `HashMap` into `hash` and `map`.
//!
//! 3. **Fuzzy**: the split query with every contents term broadened to prefix, substring
//!    and edit-distance matches. Runs only when `fuzzy_auto` is enabled.
//!
//! Each attempt first adds prefix completion to the last term. If that expands past the
//! clause ceiling, the attempt is rebuilt without it. A query that does not parse has its
//! syntax characters blanked and is parsed once more. See [`ladder`].

mod collect;
mod ladder;
mod proposals;
mod request;

use std::sync::Arc;

use hunt_config::{Config, SearchSettings};
pub use ladder::MIN_QUERY_LENGTH;
pub use request::{CancelFlag, SearchQuery};
use tracing::{debug, warn};

use crate::{listener::IndexChangeListener, reader::SharedReader, rewrite::WorkingSets};

/// Query text of the search run after each index update to warm the new reader.
const WARMUP_QUERY: &str = "<warmup search>";

/// Primary search entry point for the index.
#[allow(clippy::multiple_inherent_impl)]
pub struct Searcher {
    /// Lazily opened reader shared with other components.
    reader: Arc<SharedReader>,
    /// Search preferences.
    settings: SearchSettings,
    /// Minimum indexed word length, mirrored by query analysis.
    min_word_length: usize,
    /// Working set membership lookup.
    working_sets: Arc<dyn WorkingSets + Send + Sync>,
}

#[allow(clippy::multiple_inherent_impl)]
impl Searcher {
    /// Creates a searcher over `reader` using the preferences of `config`.
    pub fn new(reader: Arc<SharedReader>, config: &Config) -> Self {
        Self {
            reader,
            settings: config.search.clone(),
            min_word_length: config.index.min_word_length,
            working_sets: Arc::new(config.working_sets.clone()),
        }
    }

    /// Replaces the search preferences.
    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the working set lookup taken from the configuration.
    pub fn with_working_sets(mut self, working_sets: Arc<dyn WorkingSets + Send + Sync>) -> Self {
        self.working_sets = working_sets;
        self
    }

    /// Search preferences.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// The shared reader.
    pub fn reader(&self) -> &Arc<SharedReader> {
        &self.reader
    }

    /// Runs a small search so the first real search does not pay for opening the index.
    fn warm_up(&self) {
        let mut query = SearchQuery::new(WARMUP_QUERY, Some(1));
        match self.search(&mut query) {
            Ok(_) => debug!("warmed up index reader"),
            Err(err) => warn!(error = %err, "index warm-up failed"),
        }
    }
}

impl IndexChangeListener for Searcher {
    fn on_index_update(&self) {
        self.reader.invalidate();
        self.warm_up();
    }

    fn on_index_reset(&self) {
        self.reader.invalidate();
    }
}
