//! Index status detection.
//!
//! Compares the stored config hash with the current configuration and reads back the
//! hash file.

use std::{fs, io};

use hunt_config::Config;

use crate::{config_hash::compute_config_hash, location::IndexPaths};

/// Status of the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// Index exists and was built with the current settings.
    Current,
    /// Index exists but indexing settings changed (needs full rebuild).
    ConfigChanged,
    /// No index exists.
    Missing,
}

impl IndexStatus {
    /// Returns a human-readable description for display.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::ConfigChanged => "stale (config changed)",
            Self::Missing => "missing",
        }
    }

    /// Returns true if the index must be rebuilt before incremental updates make sense.
    pub fn needs_rebuild(&self) -> bool {
        !matches!(self, Self::Current)
    }
}

/// Reads the stored config hash, or `None` if there is none.
pub fn read_stored_hash(paths: &IndexPaths) -> Option<String> {
    fs::read_to_string(&paths.config_hash)
        .ok()
        .map(|s| s.trim().to_string())
}

/// Writes the config hash, creating the index directory if needed.
pub fn write_config_hash(paths: &IndexPaths, hash: &str) -> io::Result<()> {
    fs::create_dir_all(&paths.index_dir)?;
    fs::write(&paths.config_hash, hash)
}

/// Determines the status of the index at `paths` for `config`.
///
/// An index without a stored hash counts as changed.
pub fn index_status(paths: &IndexPaths, config: &Config) -> IndexStatus {
    if !paths.index_exists() {
        return IndexStatus::Missing;
    }
    match read_stored_hash(paths) {
        Some(stored) if stored == compute_config_hash(config) => IndexStatus::Current,
        _ => IndexStatus::ConfigChanged,
    }
}

/// Determines the status of the index that belongs to `config`.
pub fn detect_index_status(config: &Config) -> IndexStatus {
    IndexPaths::for_config(config).map_or(IndexStatus::Missing, |paths| {
        index_status(&paths, config)
    })
}
