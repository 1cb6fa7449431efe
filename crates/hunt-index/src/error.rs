//! Error types for the hunt-index crate.

use std::{io, path::PathBuf};

use tantivy::TantivyError;
use thiserror::Error;

/// Errors that can occur when working with the search index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Failed to open or create the index.
    #[error("failed to open index at {path}: {message}")]
    OpenIndex {
        /// Path to the index directory.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Another writer holds the index lock.
    #[error("index is locked: {0}")]
    Locked(String),

    /// Failed to write to the index.
    #[error("failed to write to index: {0}")]
    Write(String),

    /// Failed to commit changes to the index.
    #[error("failed to commit index: {0}")]
    Commit(String),

    /// Failed to read from the index.
    #[error("failed to read index: {0}")]
    Read(String),

    /// No configuration file was found, so there is no place for an index.
    #[error("no .hunt.toml found; run `hunt init` first")]
    NoConfig,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A clause could not be turned into an engine query.
    #[error("cannot compile query: {0}")]
    QueryCompile(String),

    /// Prefix, wildcard or fuzzy expansion exceeded the clause ceiling.
    #[error("query expands to more than {limit} clauses")]
    TooManyClauses {
        /// The ceiling that was exceeded.
        limit: usize,
    },
}

impl IndexError {
    /// Creates an `OpenIndex` error from a path and Tantivy error.
    pub(crate) fn open_index(path: PathBuf, source: &TantivyError) -> Self {
        match source {
            TantivyError::LockFailure(..) => Self::Locked(source.to_string()),
            _ => Self::OpenIndex {
                path,
                message: source.to_string(),
            },
        }
    }

    /// Creates a `Write` error from a Tantivy error.
    pub(crate) fn write(source: &TantivyError) -> Self {
        Self::Write(source.to_string())
    }

    /// Creates a `Commit` error from a Tantivy error.
    pub(crate) fn commit(source: &TantivyError) -> Self {
        Self::Commit(source.to_string())
    }

    /// Creates a `Read` error from a Tantivy error.
    pub(crate) fn read(source: &TantivyError) -> Self {
        Self::Read(source.to_string())
    }

    /// Returns true for failures caused by file access rather than index content.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Locked(_))
    }
}
