//! Full and incremental indexing.
//!
//! The [`Indexer`] orchestrates the indexing flow:
//! 1. Discover the files of every project the filter accepts
//! 2. Compare them against the manifest to find changes
//! 3. Read changed files and write them as [`FileDocument`]s
//! 4. Save the manifest and the config hash
//!
//! Every write runs through the [`RetryPolicy`]; the decision callback notifies listeners of
//! I/O failures and lowers the contents cap when documents cannot be written.

use std::{
    cell::Cell,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use hunt_config::{Config, FileFilter};
use tracing::{debug, info, warn};

use crate::{
    IndexError,
    config_hash::compute_config_hash,
    diff::{ManifestDiff, apply_diff, diff_manifest},
    discovery::{DiscoveredFile, discover_files},
    document::{FileDocument, file_path},
    listener::{IndexChangeListener, Listeners},
    location::IndexPaths,
    manifest::Manifest,
    retry::{RetryDecision, RetryPolicy},
    status::{index_status, write_config_hash},
    writer::{IndexWriter, reduced_max_terms, remove_index_files},
};

/// Statistics from an indexing operation.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// Number of files written to the index.
    pub files_processed: usize,
    /// Number of files skipped because they could not be read.
    pub files_skipped: usize,
    /// Number of files added (new).
    pub files_added: usize,
    /// Number of files updated (modified).
    pub files_updated: usize,
    /// Number of files removed.
    pub files_removed: usize,
    /// Archive attachments seen but not read.
    pub archives_skipped: usize,
    /// Whether the index was rebuilt from scratch.
    pub full_rebuild: bool,
    /// Files that could not be read (path, error message).
    pub read_errors: Vec<(PathBuf, String)>,
}

impl IndexStats {
    /// Returns true if no errors occurred.
    pub fn is_success(&self) -> bool {
        self.read_errors.is_empty()
    }

    /// Returns the total number of files that changed.
    pub fn total_changes(&self) -> usize {
        self.files_added + self.files_updated + self.files_removed
    }
}

/// Callback for reporting indexing progress.
pub trait ProgressReporter {
    /// Called when starting to process a file.
    fn on_file_start(&mut self, path: &Path, current: usize, total: usize);

    /// Called when a file was successfully indexed.
    fn on_file_done(&mut self, path: &Path);

    /// Called when a file could not be read.
    fn on_file_error(&mut self, path: &Path, error: &str);

    /// Called when a file was removed from the index, with its indexed path.
    fn on_file_removed(&mut self, file_path: &str);

    /// Called when indexing is complete.
    fn on_complete(&mut self, stats: &IndexStats);
}

/// A no-op progress reporter for silent indexing.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn on_file_start(&mut self, _path: &Path, _current: usize, _total: usize) {}
    fn on_file_done(&mut self, _path: &Path) {}
    fn on_file_error(&mut self, _path: &Path, _error: &str) {}
    fn on_file_removed(&mut self, _file_path: &str) {}
    fn on_complete(&mut self, _stats: &IndexStats) {}
}

/// Outcome of one write attempt over a diff.
#[derive(Default)]
struct WriteOutcome {
    /// Files written.
    processed: usize,
    /// Files that could not be read.
    errors: Vec<(DiscoveredFile, String)>,
}

/// Maintains the index of one configuration.
pub struct Indexer {
    /// The loaded configuration.
    config: Config,
    /// Decides which files get indexed.
    filter: FileFilter,
    /// Index directory and bookkeeping files.
    paths: IndexPaths,
    /// Notified after writes and on failures that invalidate readers.
    listeners: Listeners,
    /// Retry settings for writes.
    retry: RetryPolicy,
}

impl Indexer {
    /// Creates an indexer for the given configuration.
    ///
    /// Fails with [`IndexError::NoConfig`] when no config file was found.
    pub fn new(config: Config) -> Result<Self, IndexError> {
        let paths = IndexPaths::for_config(&config).ok_or(IndexError::NoConfig)?;
        Ok(Self::with_paths(config, paths))
    }

    /// Creates an indexer writing to explicit paths.
    pub fn with_paths(config: Config, paths: IndexPaths) -> Self {
        let filter = config.file_filter();
        Self {
            config,
            filter,
            paths,
            listeners: Listeners::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Registers a listener for index changes.
    pub fn add_listener(&mut self, listener: Arc<dyn IndexChangeListener>) {
        self.listeners.add(listener);
    }

    /// The configuration this indexer maintains.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Index directory and bookkeeping files.
    pub fn paths(&self) -> &IndexPaths {
        &self.paths
    }

    /// Returns the path to the index directory.
    pub fn index_dir(&self) -> &Path {
        &self.paths.index_dir
    }

    /// Rebuilds the index from scratch, ignoring the manifest.
    pub fn full_rebuild<R: ProgressReporter>(
        &self,
        reporter: &mut R,
    ) -> Result<IndexStats, IndexError> {
        info!(index = %self.paths.index_dir.display(), "full index build");
        self.listeners.notify_reset();
        self.clear_index_files()?;

        let discovery = discover_files(&self.config.projects, &self.filter);
        let mut manifest = Manifest::new();
        let diff = diff_manifest(&manifest, &discovery.files);
        let mut stats = self.index_with_diff(&mut manifest, &diff, reporter, true)?;
        stats.archives_skipped = discovery.archives.len();
        Ok(stats)
    }

    /// Updates the index with the files that changed since the last run.
    ///
    /// Falls back to a full rebuild when the index is missing, its settings changed, or the
    /// manifest cannot be read.
    pub fn incremental_update<R: ProgressReporter>(
        &self,
        reporter: &mut R,
    ) -> Result<IndexStats, IndexError> {
        let status = index_status(&self.paths, &self.config);
        if status.needs_rebuild() {
            info!(status = status.description(), "index needs a full rebuild");
            return self.full_rebuild(reporter);
        }
        let mut manifest = match Manifest::load(&self.paths.manifest) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!(error = %err, "unreadable manifest, rebuilding");
                return self.full_rebuild(reporter);
            }
        };

        let discovery = discover_files(&self.config.projects, &self.filter);
        let diff = diff_manifest(&manifest, &discovery.files);
        debug!(
            added = diff.added.len(),
            modified = diff.modified.len(),
            removed = diff.removed.len(),
            "incremental update"
        );
        let mut stats = self.index_with_diff(&mut manifest, &diff, reporter, false)?;
        stats.archives_skipped = discovery.archives.len();
        Ok(stats)
    }

    /// Writes a diff to the index and saves the bookkeeping files.
    fn index_with_diff<R: ProgressReporter>(
        &self,
        manifest: &mut Manifest,
        diff: &ManifestDiff,
        reporter: &mut R,
        full_rebuild: bool,
    ) -> Result<IndexStats, IndexError> {
        let mut stats = IndexStats {
            files_added: diff.added.len(),
            files_updated: diff.modified.len(),
            files_removed: diff.removed.len(),
            full_rebuild,
            ..Default::default()
        };

        if diff.is_empty() && !full_rebuild {
            reporter.on_complete(&stats);
            return Ok(stats);
        }

        let outcome = self.write(|writer| {
            let mut outcome = WriteOutcome::default();
            if full_rebuild {
                writer.delete_all()?;
            }
            for path in &diff.removed {
                writer.delete_file(path);
                reporter.on_file_removed(path);
            }

            let total = diff.added.len() + diff.modified.len();
            for (idx, file) in diff.files_to_index().enumerate() {
                reporter.on_file_start(&file.abs_path, idx + 1, total);
                writer.delete_file(&file.file_path());
                match fs::read_to_string(&file.abs_path) {
                    Ok(contents) => {
                        let doc = FileDocument::new(
                            file.project.as_str(),
                            file.rel_path.as_str(),
                            contents,
                            file.modified,
                        );
                        writer.add_document(&doc)?;
                        outcome.processed += 1;
                        reporter.on_file_done(&file.abs_path);
                    }
                    Err(err) => {
                        let message = err.to_string();
                        warn!(file = %file.abs_path.display(), error = %message, "skipping unreadable file");
                        reporter.on_file_error(&file.abs_path, &message);
                        outcome.errors.push((file.clone(), message));
                    }
                }
            }
            Ok(outcome)
        })?;

        apply_diff(manifest, diff);
        // Unreadable files stay out of the manifest so the next update retries them.
        for (file, _) in &outcome.errors {
            manifest.remove(&file.file_path());
        }
        manifest.save(&self.paths.manifest)?;
        write_config_hash(&self.paths, &compute_config_hash(&self.config))?;

        stats.files_processed = outcome.processed;
        stats.files_skipped = outcome.errors.len();
        stats.read_errors = outcome
            .errors
            .into_iter()
            .map(|(file, message)| (file.abs_path, message))
            .collect();
        info!(
            processed = stats.files_processed,
            skipped = stats.files_skipped,
            removed = stats.files_removed,
            "index committed"
        );
        reporter.on_complete(&stats);
        Ok(stats)
    }

    /// Deletes the whole index together with its manifest.
    pub fn delete_index(&self) -> Result<(), IndexError> {
        info!(index = %self.paths.index_dir.display(), "deleting index");
        self.listeners.notify_reset();
        self.clear_index_files()?;
        if self.paths.manifest.exists() {
            fs::remove_file(&self.paths.manifest)?;
        }
        Ok(())
    }

    /// Removes one file, given its indexed path.
    pub fn delete_file(&self, file_path: &str) -> Result<(), IndexError> {
        self.write(|writer| {
            writer.delete_file(file_path);
            Ok(())
        })?;
        self.update_manifest(|manifest| usize::from(manifest.remove(file_path).is_some()))
    }

    /// Removes every file below a folder, given its indexed path.
    pub fn delete_folder(&self, folder: &str) -> Result<(), IndexError> {
        self.write(|writer| writer.delete_folder(folder))?;
        self.update_manifest(|manifest| manifest.remove_folder(folder))
    }

    /// Removes every file of a project.
    pub fn delete_project(&self, project: &str) -> Result<(), IndexError> {
        self.write(|writer| {
            writer.delete_project(project);
            Ok(())
        })?;
        self.update_manifest(|manifest| manifest.remove_project(project))
    }

    /// Applies `edit` to the stored manifest, if there is one.
    fn update_manifest(&self, edit: impl FnOnce(&mut Manifest) -> usize) -> Result<(), IndexError> {
        if !self.paths.manifest.exists() {
            return Ok(());
        }
        let mut manifest = Manifest::load(&self.paths.manifest)?;
        let removed = edit(&mut manifest);
        debug!(removed, "manifest entries removed");
        manifest.save(&self.paths.manifest)
    }

    /// Maps a filesystem path to its indexed path.
    ///
    /// Paths inside a project directory map to `/<project>/<relative path>`; a path that is
    /// already in indexed form and names a configured project is returned as is. When
    /// project directories nest, the deepest one wins.
    pub fn index_path_for(&self, path: &Path) -> Option<String> {
        if let Some(project) = self.config.project_for_path(path)
            && let Ok(rel) = path.strip_prefix(&project.path)
        {
            let rel = rel.to_string_lossy().replace('\\', "/");
            let indexed = file_path(&project.name, &rel);
            return Some(indexed.trim_end_matches('/').to_string());
        }

        let text = path.to_str()?;
        let project = text.strip_prefix('/')?.split('/').next()?;
        self.config
            .project(project)
            .is_some()
            .then(|| text.to_string())
    }

    /// Runs `op` on a fresh writer and commits, retrying per the policy.
    ///
    /// Listeners are told about the update once the commit succeeds.
    fn write<T>(
        &self,
        mut op: impl FnMut(&mut IndexWriter) -> Result<T, IndexError>,
    ) -> Result<T, IndexError> {
        let max_terms = Cell::new(self.config.index.max_terms_per_doc);
        let result = self.retry.run(
            || {
                let mut writer =
                    IndexWriter::open(&self.paths.index_dir, self.config.index.min_word_length)?;
                writer.set_max_terms(max_terms.get());
                let result = op(&mut writer).and_then(|value| writer.commit().map(|()| value));
                if result.is_err()
                    && let Err(err) = writer.rollback()
                {
                    debug!(error = %err, "rollback failed");
                }
                result
            },
            |err| self.decide(err, &max_terms),
        )?;
        self.listeners.notify_update();
        Ok(result)
    }

    /// Removes the index files once no other writer holds the index, retrying per the policy.
    fn clear_index_files(&self) -> Result<(), IndexError> {
        let max_terms = Cell::new(self.config.index.max_terms_per_doc);
        self.retry.run(
            || remove_index_files(&self.paths.index_dir),
            |err| self.decide(err, &max_terms),
        )
    }

    /// Chooses how to continue after a failed write attempt.
    fn decide(&self, err: &IndexError, max_terms: &Cell<usize>) -> RetryDecision {
        if err.is_io() {
            self.listeners.notify_reset();
            return RetryDecision::Retry;
        }
        match err {
            IndexError::Write(_) => match reduced_max_terms(max_terms.get()) {
                Some(reduced) => {
                    warn!(max_terms = reduced, "lowering contents cap");
                    max_terms.set(reduced);
                    RetryDecision::Degrade
                }
                None => RetryDecision::Abort,
            },
            IndexError::Commit(_) => RetryDecision::Retry,
            _ => RetryDecision::Abort,
        }
    }
}

#[cfg(test)]
mod test {
    use std::{
        fs::File,
        sync::atomic::{AtomicUsize, Ordering},
        time::{Duration, SystemTime},
    };

    use hunt_config::Project;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        reader::SharedReader,
        search::{SearchQuery, Searcher},
        status::{IndexStatus, read_stored_hash},
        writer::DEFAULT_MAX_TERMS,
    };

    /// Test reporter that records all events.
    #[derive(Default)]
    struct TestReporter {
        events: Vec<String>,
    }

    impl ProgressReporter for TestReporter {
        fn on_file_start(&mut self, path: &Path, current: usize, total: usize) {
            let name = path.file_name().unwrap().to_string_lossy();
            self.events.push(format!("start: {name} ({current}/{total})"));
        }

        fn on_file_done(&mut self, path: &Path) {
            let name = path.file_name().unwrap().to_string_lossy();
            self.events.push(format!("done: {name}"));
        }

        fn on_file_error(&mut self, path: &Path, _error: &str) {
            let name = path.file_name().unwrap().to_string_lossy();
            self.events.push(format!("error: {name}"));
        }

        fn on_file_removed(&mut self, file_path: &str) {
            self.events.push(format!("removed: {file_path}"));
        }

        fn on_complete(&mut self, stats: &IndexStats) {
            self.events.push(format!(
                "complete: {} files, {} errors",
                stats.files_processed, stats.files_skipped
            ));
        }
    }

    #[derive(Default)]
    struct Counter {
        updates: AtomicUsize,
        resets: AtomicUsize,
    }

    impl IndexChangeListener for Counter {
        fn on_index_update(&self) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }

        fn on_index_reset(&self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test_config(temp: &TempDir) -> Config {
        let core = temp.path().join("core");
        fs::create_dir_all(&core).unwrap();
        Config {
            projects: vec![Project {
                name: "core".to_string(),
                path: core,
                is_global: false,
            }],
            config_root: Some(temp.path().to_path_buf()),
            ..Default::default()
        }
    }

    fn core(temp: &TempDir) -> PathBuf {
        let dir = temp.path().join("core");
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn hits(indexer: &Indexer, text: &str) -> usize {
        let reader = Arc::new(SharedReader::new(indexer.index_dir(), 1));
        let searcher = Searcher::new(reader, indexer.config());
        searcher
            .search(&mut SearchQuery::new(text, None))
            .unwrap()
            .map_or(0, |result| result.len())
    }

    fn touch(path: &Path, secs: u64) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn requires_a_config_root() {
        assert!(matches!(
            Indexer::new(Config::default()),
            Err(IndexError::NoConfig)
        ));
    }

    #[test]
    fn full_rebuild_indexes_all_files() {
        let temp = TempDir::new().unwrap();
        fs::write(core(&temp).join("App.java"), "class App { int alpha; }").unwrap();
        fs::write(core(&temp).join("notes.txt"), "beta notes").unwrap();
        fs::write(core(&temp).join("lib.jar"), "PK").unwrap();

        let indexer = Indexer::new(test_config(&temp)).unwrap();
        let mut reporter = TestReporter::default();
        let stats = indexer.full_rebuild(&mut reporter).unwrap();

        assert!(stats.full_rebuild);
        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.files_added, 2);
        assert_eq!(stats.archives_skipped, 1);
        assert_eq!(
            reporter.events,
            vec![
                "start: App.java (1/2)",
                "done: App.java",
                "start: notes.txt (2/2)",
                "done: notes.txt",
                "complete: 2 files, 0 errors",
            ]
        );
        assert_eq!(hits(&indexer, "alpha"), 1);
        assert_eq!(
            index_status(indexer.paths(), indexer.config()),
            IndexStatus::Current
        );
        assert!(read_stored_hash(indexer.paths()).is_some());
    }

    #[test]
    fn incremental_update_skips_unchanged_files() {
        let temp = TempDir::new().unwrap();
        fs::write(core(&temp).join("a.txt"), "alpha").unwrap();

        let indexer = Indexer::new(test_config(&temp)).unwrap();
        indexer.full_rebuild(&mut SilentReporter).unwrap();

        let stats = indexer.incremental_update(&mut SilentReporter).unwrap();
        assert!(!stats.full_rebuild);
        assert_eq!(stats.files_processed, 0);
        assert_eq!(stats.total_changes(), 0);
    }

    #[test]
    fn incremental_update_without_index_rebuilds() {
        let temp = TempDir::new().unwrap();
        fs::write(core(&temp).join("a.txt"), "alpha").unwrap();

        let indexer = Indexer::new(test_config(&temp)).unwrap();
        let stats = indexer.incremental_update(&mut SilentReporter).unwrap();
        assert!(stats.full_rebuild);
        assert_eq!(stats.files_processed, 1);
    }

    #[test]
    fn settings_change_forces_rebuild() {
        let temp = TempDir::new().unwrap();
        fs::write(core(&temp).join("a.txt"), "alpha").unwrap();
        Indexer::new(test_config(&temp))
            .unwrap()
            .full_rebuild(&mut SilentReporter)
            .unwrap();

        let mut config = test_config(&temp);
        config.index.min_word_length = 2;
        let stats = Indexer::new(config)
            .unwrap()
            .incremental_update(&mut SilentReporter)
            .unwrap();
        assert!(stats.full_rebuild);
    }

    #[test]
    fn incremental_update_detects_changes() {
        let temp = TempDir::new().unwrap();
        let dir = core(&temp);
        fs::write(dir.join("keep.txt"), "alpha").unwrap();
        fs::write(dir.join("change.txt"), "original").unwrap();
        fs::write(dir.join("remove.txt"), "zebra").unwrap();
        touch(&dir.join("change.txt"), 1_000);

        let indexer = Indexer::new(test_config(&temp)).unwrap();
        indexer.full_rebuild(&mut SilentReporter).unwrap();

        fs::write(dir.join("change.txt"), "replacement").unwrap();
        touch(&dir.join("change.txt"), 2_000);
        fs::remove_file(dir.join("remove.txt")).unwrap();
        fs::write(dir.join("new.txt"), "quokka").unwrap();

        let mut reporter = TestReporter::default();
        let stats = indexer.incremental_update(&mut reporter).unwrap();
        assert_eq!(stats.files_added, 1);
        assert_eq!(stats.files_updated, 1);
        assert_eq!(stats.files_removed, 1);
        assert_eq!(stats.files_processed, 2);
        assert!(reporter.events.contains(&"removed: /core/remove.txt".to_string()));

        assert_eq!(hits(&indexer, "zebra"), 0);
        assert_eq!(hits(&indexer, "original"), 0);
        assert_eq!(hits(&indexer, "replacement"), 1);
        assert_eq!(hits(&indexer, "quokka"), 1);
        assert_eq!(hits(&indexer, "alpha"), 1);
    }

    #[test]
    fn unreadable_files_are_skipped_and_retried() {
        let temp = TempDir::new().unwrap();
        fs::write(core(&temp).join("valid.txt"), "alpha").unwrap();
        fs::write(core(&temp).join("invalid.txt"), [0xFF, 0xFE, 0x00, 0x01]).unwrap();

        let indexer = Indexer::new(test_config(&temp)).unwrap();
        let stats = indexer.full_rebuild(&mut SilentReporter).unwrap();
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_skipped, 1);
        assert!(!stats.is_success());

        let manifest = Manifest::load(&indexer.paths().manifest).unwrap();
        assert_eq!(manifest.len(), 1);
        let again = indexer.incremental_update(&mut SilentReporter).unwrap();
        assert_eq!(again.files_added, 1);
    }

    #[test]
    fn deletes_keep_manifest_in_sync() {
        let temp = TempDir::new().unwrap();
        let dir = core(&temp);
        fs::create_dir_all(dir.join("src/util")).unwrap();
        fs::write(dir.join("top.txt"), "alpha").unwrap();
        fs::write(dir.join("src/a.txt"), "alpha").unwrap();
        fs::write(dir.join("src/util/b.txt"), "alpha").unwrap();

        let indexer = Indexer::new(test_config(&temp)).unwrap();
        indexer.full_rebuild(&mut SilentReporter).unwrap();
        assert_eq!(hits(&indexer, "alpha"), 3);

        indexer.delete_file("/core/top.txt").unwrap();
        assert_eq!(hits(&indexer, "alpha"), 2);
        indexer.delete_folder("/core/src").unwrap();
        assert_eq!(hits(&indexer, "alpha"), 0);

        let manifest = Manifest::load(&indexer.paths().manifest).unwrap();
        assert!(manifest.is_empty());

        // The files are still on disk, so an update brings them back.
        indexer.incremental_update(&mut SilentReporter).unwrap();
        assert_eq!(hits(&indexer, "alpha"), 3);
        indexer.delete_project("core").unwrap();
        assert_eq!(hits(&indexer, "alpha"), 0);
    }

    #[test]
    fn delete_index_removes_everything() {
        let temp = TempDir::new().unwrap();
        fs::write(core(&temp).join("a.txt"), "alpha").unwrap();

        let mut indexer = Indexer::new(test_config(&temp)).unwrap();
        let counter = Arc::new(Counter::default());
        indexer.add_listener(counter.clone());
        indexer.full_rebuild(&mut SilentReporter).unwrap();
        assert_eq!(counter.updates.load(Ordering::SeqCst), 1);

        indexer.delete_index().unwrap();
        assert!(!indexer.paths().index_exists());
        assert!(!indexer.paths().manifest.exists());
        assert_eq!(counter.resets.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn held_lock_is_retried_then_reported() {
        let temp = TempDir::new().unwrap();
        fs::write(core(&temp).join("a.txt"), "alpha").unwrap();

        let mut indexer = Indexer::new(test_config(&temp))
            .unwrap()
            .with_retry(RetryPolicy::immediate(3));
        let counter = Arc::new(Counter::default());
        indexer.add_listener(counter.clone());

        let held = IndexWriter::open(indexer.index_dir(), 1).unwrap();
        let err = indexer.full_rebuild(&mut SilentReporter).unwrap_err();
        assert!(matches!(err, IndexError::Locked(_)));
        // One reset for the rebuild, then one per failed attempt.
        assert_eq!(counter.resets.load(Ordering::SeqCst), 4);
        assert!(matches!(
            indexer.delete_index(),
            Err(IndexError::Locked(_))
        ));

        drop(held);
        let stats = indexer.full_rebuild(&mut SilentReporter).unwrap();
        assert_eq!(stats.files_processed, 1);
        assert_eq!(hits(&indexer, "alpha"), 1);
    }

    #[test]
    fn maps_filesystem_paths_to_indexed_paths() {
        let temp = TempDir::new().unwrap();
        let indexer = Indexer::new(test_config(&temp)).unwrap();
        let dir = core(&temp);

        assert_eq!(
            indexer.index_path_for(&dir.join("src").join("A.java")).as_deref(),
            Some("/core/src/A.java")
        );
        assert_eq!(
            indexer.index_path_for(&dir.join("src")).as_deref(),
            Some("/core/src")
        );
        assert_eq!(
            indexer.index_path_for(Path::new("/core/src/A.java")).as_deref(),
            Some("/core/src/A.java")
        );
        assert_eq!(indexer.index_path_for(Path::new("/elsewhere/x")), None);
    }

    #[test]
    fn retry_decisions() {
        let temp = TempDir::new().unwrap();
        let mut indexer = Indexer::new(test_config(&temp)).unwrap();
        let counter = Arc::new(Counter::default());
        indexer.add_listener(counter.clone());

        let cap = Cell::new(DEFAULT_MAX_TERMS * 4);
        assert_eq!(
            indexer.decide(&IndexError::Locked("busy".into()), &cap),
            RetryDecision::Retry
        );
        assert_eq!(counter.resets.load(Ordering::SeqCst), 1);

        let write = IndexError::Write("out of memory".into());
        assert_eq!(indexer.decide(&write, &cap), RetryDecision::Degrade);
        assert_eq!(cap.get(), DEFAULT_MAX_TERMS * 2);
        assert_eq!(indexer.decide(&write, &cap), RetryDecision::Degrade);
        assert_eq!(indexer.decide(&write, &cap), RetryDecision::Abort);
        assert_eq!(cap.get(), DEFAULT_MAX_TERMS);

        assert_eq!(
            indexer.decide(&IndexError::Commit("x".into()), &cap),
            RetryDecision::Retry
        );
        assert_eq!(indexer.decide(&IndexError::NoConfig, &cap), RetryDecision::Abort);
    }
}
