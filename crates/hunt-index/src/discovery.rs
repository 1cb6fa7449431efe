//! File discovery for indexing.
//!
//! Walks every project directory and keeps the files the configured [`FileFilter`] accepts.
//! Hidden entries, symlinks and known binary formats are skipped; excluded directories are
//! pruned without descending into them. Archives are listed separately since their
//! contents are not read.

use std::{
    ffi::OsStr,
    fs::Metadata,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use hunt_config::{FileFilter, Project};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::document::file_path;

/// Extensions of archive attachments.
const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip", "war", "ear"];

/// A file discovered for indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Project this file belongs to.
    pub project: String,
    /// Absolute path to the file.
    pub abs_path: PathBuf,
    /// Path relative to the project root, with forward slashes.
    pub rel_path: String,
    /// Modification time in milliseconds since the epoch.
    pub modified: i64,
}

impl DiscoveredFile {
    /// Indexed path, `/<project>/<relative path>`.
    pub fn file_path(&self) -> String {
        file_path(&self.project, &self.rel_path)
    }
}

/// Everything one walk found.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Indexable files.
    pub files: Vec<DiscoveredFile>,
    /// Archive files seen, which are not indexed.
    pub archives: Vec<PathBuf>,
}

/// Discovers the indexable files of `projects`.
///
/// A project whose directory does not exist is skipped with a warning.
pub fn discover_files(projects: &[Project], filter: &FileFilter) -> Discovery {
    let mut discovery = Discovery::default();

    for project in projects {
        if !project.path.is_dir() {
            warn!(project = project.name, path = %project.path.display(), "project directory not found");
            continue;
        }
        discover_project(project, filter, &mut discovery);
    }

    debug!(
        files = discovery.files.len(),
        archives = discovery.archives.len(),
        "discovered files"
    );
    discovery
}

/// Walks one project directory.
fn discover_project(project: &Project, filter: &FileFilter, discovery: &mut Discovery) {
    let root = &project.path;
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if is_hidden(entry.file_name()) {
                return false;
            }
            if entry.file_type().is_dir()
                && let Ok(rel_dir) = entry.path().strip_prefix(root)
            {
                return !filter.is_excluded_dir(&project.name, rel_dir);
            }
            true
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let abs_path = entry.path().to_path_buf();
        let Ok(rel) = abs_path.strip_prefix(root) else {
            continue;
        };
        if is_archive(rel) {
            discovery.archives.push(abs_path);
            continue;
        }
        if is_binary_file(rel) || !filter.accepts(&project.name, rel) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        discovery.files.push(DiscoveredFile {
            project: project.name.clone(),
            rel_path: rel.to_string_lossy().replace('\\', "/"),
            modified: modified_millis(&metadata),
            abs_path,
        });
    }
}

/// Modification time in milliseconds since the epoch, zero if unavailable.
pub fn modified_millis(metadata: &Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .map_or(0, system_time_millis)
}

/// Converts a timestamp to milliseconds since the epoch.
fn system_time_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

/// Checks if a filename represents a hidden file (starts with '.').
fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

/// Lowercase extension of `path`.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Checks if a file is an archive attachment.
fn is_archive(path: &Path) -> bool {
    extension(path).is_some_and(|ext| ARCHIVE_EXTENSIONS.contains(&ext.as_str()))
}

/// Checks if a file is likely binary based on extension.
///
/// Only matters when every extension is indexable.
fn is_binary_file(path: &Path) -> bool {
    const BINARY_EXTENSIONS: &[&str] = &[
        // Images
        "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "tif", "psd",
        // Audio and video
        "mp3", "wav", "flac", "ogg", "mp4", "avi", "mkv", "mov", "webm",
        // Archives
        "tar", "gz", "bz2", "xz", "7z", "rar", "iso",
        // Executables and objects
        "exe", "dll", "so", "dylib", "bin", "class", "pyc", "o", "a", "lib", "obj", "wasm",
        // Documents and fonts
        "pdf", "doc", "docx", "xls", "xlsx", "ttf", "otf", "woff", "woff2",
        // Databases
        "db", "sqlite", "sqlite3",
    ];

    extension(path).is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.as_str()))
}
