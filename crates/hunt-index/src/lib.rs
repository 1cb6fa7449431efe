//! Tantivy-based code search index for hunt.
//!
//! This crate provides the indexing and search infrastructure behind the `hunt` tool:
//! - Code-aware tokenization (camel case, dot and word splits) for contents and file names
//! - Index creation, incremental maintenance and deletion with bounded write retries
//! - A clause tree with rewrite stages turning user input into an engine query
//! - A searcher that falls back from exact to split to fuzzy matching
//! - Background jobs: serialized index mutations, periodic updates and debounced searches
//!
//! # Example
//!
//! ```no_run
//! use std::{path::Path, sync::Arc};
//!
//! use hunt_config::Config;
//! use hunt_index::{Indexer, SearchQuery, Searcher, SharedReader, SilentReporter};
//!
//! let config = Config::load(Path::new(".")).unwrap();
//! let indexer = Indexer::new(config.clone()).unwrap();
//! indexer.incremental_update(&mut SilentReporter).unwrap();
//!
//! let reader = Arc::new(SharedReader::new(indexer.index_dir(), config.index.min_word_length));
//! let searcher = Searcher::new(reader, &config);
//! let mut query = SearchQuery::new("HashMap", Some(25));
//! if let Some(result) = searcher.search(&mut query).unwrap() {
//!     for doc in result.docs() {
//!         println!("{}", doc.file.file);
//!     }
//! }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod clause;
mod config_hash;
mod diff;
mod discovery;
mod document;
mod error;
mod field;
mod indexer;
mod jobs;
mod listener;
mod location;
mod manifest;
mod query;
mod reader;
mod result;
mod retry;
mod rewrite;
mod schema;
mod search;
mod status;
mod tokenizer;
mod visit;
mod writer;

pub use analyzer::{AnalysisMode, extract_text_terms};
pub use clause::{BooleanClause, Clause, FieldRef, Occur, PhraseClause, RangeClause, TermClause};
pub use config_hash::{IndexingConfig, SCHEMA_VERSION, compute_config_hash};
pub use discovery::{DiscoveredFile, Discovery, discover_files};
pub use document::{FileDocument, file_path};
pub use error::IndexError;
pub use field::{Field, NO_VALUE};
pub use indexer::{IndexStats, Indexer, ProgressReporter, SilentReporter};
pub use jobs::{IndexJobs, IndexLock, PeriodicUpdate, SearchOutcome, SearchScheduler};
pub use listener::{IndexChangeListener, Listeners};
pub use location::{IndexPaths, global_index_directory, index_directory, is_hunt_data};
pub use manifest::{Manifest, ManifestEntry};
pub use query::{ClauseBuilder, MAX_CLAUSE_COUNT, QueryError, QueryErrorKind};
pub use reader::SharedReader;
pub use result::{SearchResult, SearchResultDoc, StoredFile};
pub use retry::{MAX_RETRY_ATTEMPTS, RetryDecision, RetryPolicy};
pub use rewrite::{CURRENT_PROJECT, DURATION_NAMES, Filter, WorkingSets, duration_range};
pub use search::{CancelFlag, MIN_QUERY_LENGTH, SearchQuery, Searcher};
pub use status::{IndexStatus, detect_index_status, read_stored_hash};
pub use tokenizer::{split_camel_case, split_dots, split_words};
pub use writer::{DEFAULT_MAX_TERMS, IndexWriter};
