//! Manifest diffing for incremental updates.
//!
//! Compares the current filesystem state against the stored manifest to
//! determine which files need to be indexed, reindexed, or removed.

use std::collections::HashSet;

use crate::{
    discovery::DiscoveredFile,
    manifest::{Manifest, ManifestEntry},
};

/// The result of diffing the current filesystem against the manifest.
#[derive(Debug, Default)]
pub struct ManifestDiff {
    /// Files that are new and need to be indexed.
    pub added: Vec<DiscoveredFile>,
    /// Files that have been modified since last indexing.
    pub modified: Vec<DiscoveredFile>,
    /// Indexed paths of files that have been removed.
    pub removed: Vec<String>,
}

impl ManifestDiff {
    /// Returns true if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Returns the total number of files that need processing.
    pub fn total_changes(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    /// Returns all files that need indexing (both added and modified).
    pub fn files_to_index(&self) -> impl Iterator<Item = &DiscoveredFile> {
        self.added.iter().chain(self.modified.iter())
    }
}

/// Computes the difference between discovered files and the stored manifest.
///
/// A file counts as modified when its millisecond timestamp differs from the stored one,
/// in either direction, so restoring an older copy is picked up too.
pub fn diff_manifest(manifest: &Manifest, discovered: &[DiscoveredFile]) -> ManifestDiff {
    let mut diff = ManifestDiff::default();
    let mut seen: HashSet<String> = HashSet::new();

    for file in discovered {
        let file_path = file.file_path();
        match manifest.get(&file_path) {
            None => diff.added.push(file.clone()),
            Some(entry) if entry.modified != file.modified => diff.modified.push(file.clone()),
            Some(_) => {}
        }
        seen.insert(file_path);
    }

    diff.removed = manifest
        .entries()
        .filter(|(path, _)| !seen.contains(*path))
        .map(|(path, _)| path.clone())
        .collect();

    diff
}

/// Updates the manifest to reflect the current state after processing a diff.
pub fn apply_diff(manifest: &mut Manifest, diff: &ManifestDiff) {
    for path in &diff.removed {
        manifest.remove(path);
    }
    for file in diff.files_to_index() {
        record(manifest, file);
    }
}

/// Records one indexed file in the manifest.
pub fn record(manifest: &mut Manifest, file: &DiscoveredFile) {
    manifest.insert(
        file.file_path(),
        ManifestEntry {
            project: file.project.clone(),
            abs_path: file.abs_path.clone(),
            modified: file.modified,
        },
    );
}
