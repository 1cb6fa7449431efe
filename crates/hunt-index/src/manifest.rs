//! Manifest tracking for indexed files.
//!
//! The manifest records every indexed file under its indexed path together with its
//! location on disk and the modification time it had when indexed. Incremental updates
//! diff it against a fresh walk to find what changed.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::IndexError;

/// An entry in the manifest representing a single indexed file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Project the file belongs to.
    pub project: String,
    /// Absolute path on disk.
    pub abs_path: PathBuf,
    /// Modification time in milliseconds when last indexed.
    pub modified: i64,
}

/// Tracks indexed files and their modification times.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Map from indexed path (`/<project>/<relative path>`) to entry.
    #[serde(default)]
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Creates a new empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a manifest from a JSON file.
    ///
    /// Returns an empty manifest if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            IndexError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to parse manifest: {e}"),
            ))
        })
    }

    /// Saves the manifest as JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            IndexError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize manifest: {e}"),
            ))
        })?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Adds or updates an entry.
    pub fn insert(&mut self, file_path: String, entry: ManifestEntry) {
        self.entries.insert(file_path, entry);
    }

    /// Removes the entry of one file.
    pub fn remove(&mut self, file_path: &str) -> Option<ManifestEntry> {
        self.entries.remove(file_path)
    }

    /// Removes every entry below `folder`, returning how many were removed.
    pub fn remove_folder(&mut self, folder: &str) -> usize {
        let prefix = format!("{}/", folder.trim_end_matches('/'));
        let before = self.entries.len();
        self.entries.retain(|path, _| !path.starts_with(&prefix));
        before - self.entries.len()
    }

    /// Removes every entry of `project`, returning how many were removed.
    pub fn remove_project(&mut self, project: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.project != project);
        before - self.entries.len()
    }

    /// Gets an entry by indexed path.
    pub fn get(&self, file_path: &str) -> Option<&ManifestEntry> {
        self.entries.get(file_path)
    }

    /// Iterates over entries in path order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &ManifestEntry)> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
