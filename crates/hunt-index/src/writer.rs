//! Index writer for adding and removing file documents.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tantivy::{
    Index, IndexWriter as TantivyIndexWriter, TantivyError, Term,
    directory::{Directory, DirectoryLock, INDEX_WRITER_LOCK, MmapDirectory},
    query::RegexQuery,
};
use tracing::{debug, info, warn};

use crate::{
    analyzer::{CODE_TOKENIZER, build_index_analyzer},
    document::FileDocument,
    error::IndexError,
    schema::IndexSchema,
};

/// Default heap size for the index writer (50 MB).
const DEFAULT_HEAP_SIZE: usize = 50_000_000;

/// Smallest contents cap a degraded writer falls back to.
pub const DEFAULT_MAX_TERMS: usize = 10_000;

/// Writes file documents to a Tantivy index.
///
/// The writer opens or creates an index at the specified path and provides
/// methods to add, delete, and commit documents.
pub struct IndexWriter {
    /// Index directory.
    path: PathBuf,
    /// The Tantivy index.
    index: Index,
    /// The underlying Tantivy writer.
    writer: TantivyIndexWriter,
    /// Schema with field handles.
    schema: IndexSchema,
    /// Most contents tokens indexed per document.
    max_terms: usize,
}

impl IndexWriter {
    /// Opens or creates an index at the given path.
    ///
    /// The writer lock is an OS file lock on `.tantivy-writer.lock`. A lock left behind by a
    /// process that exited is released with that process and is reacquired here. A lock held
    /// by a live writer is reported as [`IndexError::Locked`] for the retry policy to wait on.
    pub fn open(path: &Path, min_word_length: usize) -> Result<Self, IndexError> {
        let schema = IndexSchema::new();

        fs::create_dir_all(path)?;

        let dir = MmapDirectory::open(path).map_err(|e| {
            let err: TantivyError = e.into();
            IndexError::open_index(path.to_path_buf(), &err)
        })?;

        let index = Index::open_or_create(dir, schema.schema().clone())
            .map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;
        index
            .tokenizers()
            .register(CODE_TOKENIZER, build_index_analyzer(min_word_length));

        let writer = index
            .writer(DEFAULT_HEAP_SIZE)
            .map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;

        Ok(Self {
            path: path.to_path_buf(),
            index,
            writer,
            schema,
            max_terms: hunt_config::DEFAULT_MAX_TERMS_PER_DOC,
        })
    }

    /// Index directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Most contents tokens indexed per document.
    pub fn max_terms(&self) -> usize {
        self.max_terms
    }

    /// Sets the contents cap.
    pub fn set_max_terms(&mut self, max_terms: usize) {
        self.max_terms = max_terms.max(1);
    }

    /// Halves the contents cap, not going below [`DEFAULT_MAX_TERMS`].
    ///
    /// Returns false if the cap is already at the floor.
    pub fn reduce_max_terms(&mut self) -> bool {
        let Some(reduced) = reduced_max_terms(self.max_terms) else {
            return false;
        };
        self.max_terms = reduced;
        warn!(max_terms = self.max_terms, "reduced contents cap");
        true
    }

    /// Adds a file document to the index.
    ///
    /// The document is staged for writing but not committed until [`Self::commit`] is called.
    pub fn add_document(&mut self, doc: &FileDocument) -> Result<(), IndexError> {
        let tantivy_doc = doc.to_tantivy(&self.schema, self.max_terms);
        self.writer
            .add_document(tantivy_doc)
            .map_err(|e| IndexError::write(&e))?;
        Ok(())
    }

    /// Deletes the document of one file, given its indexed path.
    pub fn delete_file(&mut self, file_path: &str) {
        debug!(file = file_path, "delete file");
        self.writer
            .delete_term(Term::from_field_text(self.schema.file, file_path));
    }

    /// Deletes every document below a folder, given its indexed path.
    pub fn delete_folder(&mut self, folder: &str) -> Result<(), IndexError> {
        let folder = folder.trim_end_matches('/');
        debug!(folder, "delete folder");
        let pattern = format!("{}/.*", regex::escape(folder));
        let query = RegexQuery::from_pattern(&pattern, self.schema.file)
            .map_err(|e| IndexError::write(&e))?;
        self.writer
            .delete_query(Box::new(query))
            .map_err(|e| IndexError::write(&e))?;
        Ok(())
    }

    /// Deletes every document of a project.
    pub fn delete_project(&mut self, project: &str) {
        debug!(project, "delete project");
        self.writer
            .delete_term(Term::from_field_text(self.schema.proj, project));
    }

    /// Commits all pending changes to the index.
    ///
    /// This makes all added and deleted documents visible to readers.
    pub fn commit(&mut self) -> Result<(), IndexError> {
        self.writer.commit().map_err(|e| IndexError::commit(&e))?;
        Ok(())
    }

    /// Rolls back any uncommitted changes.
    pub fn rollback(&mut self) -> Result<(), IndexError> {
        self.writer.rollback().map_err(|e| IndexError::commit(&e))?;
        Ok(())
    }

    /// Deletes all documents from the index.
    pub fn delete_all(&mut self) -> Result<(), IndexError> {
        self.writer
            .delete_all_documents()
            .map_err(|e| IndexError::write(&e))?;
        Ok(())
    }

    /// Returns the number of committed documents in the index.
    pub fn num_docs(&self) -> Result<u64, IndexError> {
        let reader = self.index.reader().map_err(|e| IndexError::read(&e))?;
        Ok(reader.searcher().num_docs())
    }
}

/// Half of `current`, not going below [`DEFAULT_MAX_TERMS`].
///
/// Returns `None` if `current` is already at the floor.
pub fn reduced_max_terms(current: usize) -> Option<usize> {
    (current > DEFAULT_MAX_TERMS).then(|| (current / 2).max(DEFAULT_MAX_TERMS))
}

/// Takes the writer lock of the index at `path` without opening the index.
fn lock_index_dir(path: &Path) -> Result<DirectoryLock, IndexError> {
    let dir = MmapDirectory::open(path).map_err(|e| {
        let err: TantivyError = e.into();
        IndexError::open_index(path.to_path_buf(), &err)
    })?;
    dir.acquire_lock(&INDEX_WRITER_LOCK).map_err(|e| {
        IndexError::open_index(path.to_path_buf(), &TantivyError::LockFailure(e, None))
    })
}

/// Removes every file of the index at `path` except the writer lock.
///
/// The writer lock is held while removing, so an index a live writer is using is reported as
/// [`IndexError::Locked`] and left untouched.
pub fn remove_index_files(path: &Path) -> Result<(), IndexError> {
    if !path.exists() {
        return Ok(());
    }
    let _lock = lock_index_dir(path)?;
    let lock_path = path.join(&INDEX_WRITER_LOCK.filepath);
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path == lock_path {
            continue;
        }
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&entry_path)?;
        } else {
            fs::remove_file(&entry_path)?;
        }
    }
    info!(path = %path.display(), "removed index files");
    Ok(())
}

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use super::*;

    fn doc(project: &str, path: &str, contents: &str) -> FileDocument {
        FileDocument::new(project, path, contents.to_string(), 0)
    }

    #[test]
    fn creates_index_in_empty_directory() {
        let temp = TempDir::new().unwrap();
        let writer = IndexWriter::open(temp.path(), 1).unwrap();

        assert!(temp.path().join("meta.json").exists());
        drop(writer);
    }

    #[test]
    fn adds_and_commits_document() {
        let temp = TempDir::new().unwrap();
        let mut writer = IndexWriter::open(temp.path(), 1).unwrap();

        writer.add_document(&doc("p", "a.txt", "alpha")).unwrap();
        writer.commit().unwrap();

        assert_eq!(writer.num_docs().unwrap(), 1);
    }

    #[test]
    fn reopens_existing_index() {
        let temp = TempDir::new().unwrap();

        {
            let mut writer = IndexWriter::open(temp.path(), 1).unwrap();
            writer.add_document(&doc("p", "a.txt", "alpha")).unwrap();
            writer.commit().unwrap();
        }

        {
            let writer = IndexWriter::open(temp.path(), 1).unwrap();
            assert_eq!(writer.num_docs().unwrap(), 1);
        }
    }

    #[test]
    fn deletes_by_file_folder_and_project() {
        let temp = TempDir::new().unwrap();
        let mut writer = IndexWriter::open(temp.path(), 1).unwrap();
        for (project, path) in [
            ("core", "src/a.txt"),
            ("core", "src/b.txt"),
            ("core", "srcx/c.txt"),
            ("core", "top.txt"),
            ("api", "src/a.txt"),
        ] {
            writer.add_document(&doc(project, path, "x")).unwrap();
        }
        writer.commit().unwrap();

        writer.delete_file("/core/top.txt");
        writer.commit().unwrap();
        assert_eq!(writer.num_docs().unwrap(), 4);

        writer.delete_folder("/core/src/").unwrap();
        writer.commit().unwrap();
        assert_eq!(writer.num_docs().unwrap(), 2);

        writer.delete_project("core");
        writer.commit().unwrap();
        assert_eq!(writer.num_docs().unwrap(), 1);
    }

    #[test]
    fn delete_all_removes_documents() {
        let temp = TempDir::new().unwrap();
        let mut writer = IndexWriter::open(temp.path(), 1).unwrap();

        writer.add_document(&doc("p", "a.txt", "alpha")).unwrap();
        writer.commit().unwrap();

        writer.delete_all().unwrap();
        writer.commit().unwrap();

        assert_eq!(writer.num_docs().unwrap(), 0);
    }

    #[test]
    fn rollback_discards_uncommitted_changes() {
        let temp = TempDir::new().unwrap();
        let mut writer = IndexWriter::open(temp.path(), 1).unwrap();

        writer.add_document(&doc("p", "a.txt", "alpha")).unwrap();
        writer.rollback().unwrap();
        writer.commit().unwrap();

        assert_eq!(writer.num_docs().unwrap(), 0);
    }

    #[test]
    fn contents_cap_degrades_to_floor() {
        let temp = TempDir::new().unwrap();
        let mut writer = IndexWriter::open(temp.path(), 1).unwrap();
        writer.set_max_terms(30_000);
        assert!(writer.reduce_max_terms());
        assert_eq!(writer.max_terms(), 15_000);
        assert!(writer.reduce_max_terms());
        assert_eq!(writer.max_terms(), DEFAULT_MAX_TERMS);
        assert!(!writer.reduce_max_terms());
        assert_eq!(reduced_max_terms(DEFAULT_MAX_TERMS), None);
        assert_eq!(reduced_max_terms(DEFAULT_MAX_TERMS + 2), Some(DEFAULT_MAX_TERMS));
    }

    #[test]
    fn live_lock_is_not_taken_over() {
        let temp = TempDir::new().unwrap();
        let mut first = IndexWriter::open(temp.path(), 1).unwrap();

        let second = IndexWriter::open(temp.path(), 1);
        assert!(matches!(second, Err(IndexError::Locked(_))));
        assert!(temp.path().join(&INDEX_WRITER_LOCK.filepath).exists());

        first.add_document(&doc("p", "a.txt", "alpha")).unwrap();
        first.commit().unwrap();
        assert_eq!(first.num_docs().unwrap(), 1);
    }

    #[test]
    fn released_lock_is_reacquired() {
        let temp = TempDir::new().unwrap();
        drop(IndexWriter::open(temp.path(), 1).unwrap());
        fs::write(temp.path().join(&INDEX_WRITER_LOCK.filepath), "").unwrap();

        let mut writer = IndexWriter::open(temp.path(), 1).unwrap();
        writer.add_document(&doc("p", "a.txt", "alpha")).unwrap();
        writer.commit().unwrap();
        assert_eq!(writer.num_docs().unwrap(), 1);
    }

    #[test]
    fn remove_index_files_empties_directory() {
        let temp = TempDir::new().unwrap();
        {
            let mut writer = IndexWriter::open(temp.path(), 1).unwrap();
            writer.add_document(&doc("p", "a.txt", "alpha")).unwrap();
            writer.commit().unwrap();
        }
        remove_index_files(temp.path()).unwrap();
        let left: Vec<PathBuf> = fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(left, vec![temp.path().join(&INDEX_WRITER_LOCK.filepath)]);
        assert!(IndexWriter::open(temp.path(), 1).is_ok());
    }

    #[test]
    fn files_of_a_live_index_are_kept() {
        let temp = TempDir::new().unwrap();
        let mut writer = IndexWriter::open(temp.path(), 1).unwrap();
        writer.add_document(&doc("p", "a.txt", "alpha")).unwrap();
        writer.commit().unwrap();

        assert!(matches!(
            remove_index_files(temp.path()),
            Err(IndexError::Locked(_))
        ));
        assert!(temp.path().join("meta.json").exists());
        assert_eq!(writer.num_docs().unwrap(), 1);
    }
}
