//! Shared, lazily opened index reader.

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use tantivy::{
    Index, IndexReader, ReloadPolicy, Searcher as TvSearcher, TantivyError,
    directory::MmapDirectory,
};
use tracing::debug;

use crate::{
    IndexError,
    analyzer::{CODE_TOKENIZER, build_index_analyzer},
    schema::IndexSchema,
};

/// Opens the index at `path` and registers the contents analyzer.
pub(crate) fn open_index(path: &Path, min_word_length: usize) -> Result<Index, IndexError> {
    if !path.join("meta.json").exists() {
        return Err(IndexError::OpenIndex {
            path: path.to_path_buf(),
            message: "index does not exist".to_string(),
        });
    }
    let dir = MmapDirectory::open(path).map_err(|e| {
        let err: TantivyError = e.into();
        IndexError::open_index(path.to_path_buf(), &err)
    })?;
    let index = Index::open(dir).map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;
    index
        .tokenizers()
        .register(CODE_TOKENIZER, build_index_analyzer(min_word_length));
    Ok(index)
}

/// An open reader and the schema it was opened with.
struct OpenReader {
    /// Reader handle.
    reader: IndexReader,
    /// Field handles.
    schema: IndexSchema,
}

/// One reader handle shared by every search of a session.
///
/// The handle is opened on first use and dropped on any index change notification, so the
/// next search reopens it.
pub struct SharedReader {
    /// Index directory.
    path: PathBuf,
    /// Minimum indexed word length.
    min_word_length: usize,
    /// The cached handle.
    slot: Mutex<Option<OpenReader>>,
}

impl SharedReader {
    /// Creates a reader for the index at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>, min_word_length: usize) -> Self {
        Self {
            path: path.into(),
            min_word_length,
            slot: Mutex::new(None),
        }
    }

    /// Index directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Locks the slot, recovering from a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, Option<OpenReader>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a searcher over the current snapshot and the schema, opening the index
    /// if needed.
    pub fn searcher(&self) -> Result<(TvSearcher, IndexSchema), IndexError> {
        let mut slot = self.lock();
        if let Some(open) = slot.as_ref() {
            return Ok((open.reader.searcher(), open.schema.clone()));
        }
        debug!(path = %self.path.display(), "opening index reader");
        let index = open_index(&self.path, self.min_word_length)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| IndexError::open_index(self.path.clone(), &e))?;
        let open = OpenReader {
            reader,
            schema: IndexSchema::new(),
        };
        let result = (open.reader.searcher(), open.schema.clone());
        *slot = Some(open);
        Ok(result)
    }

    /// Returns true if a handle is currently cached.
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Drops the cached handle.
    pub fn invalidate(&self) {
        if self.lock().take().is_some() {
            debug!(path = %self.path.display(), "closed index reader");
        }
    }
}
