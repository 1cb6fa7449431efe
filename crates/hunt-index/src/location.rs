//! Index location resolution.
//!
//! The index lives in `.hunt/index/` next to the most specific `.hunt.toml`, or in
//! `~/.hunt/index/` when only the global config exists. The manifest of indexed files sits
//! beside the index directory and the config hash inside it.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use hunt_config::{CONFIG_FILENAME, Config};

/// Directory name for hunt data (sibling to .hunt.toml).
const HUNT_DIR: &str = ".hunt";
/// Subdirectory within .hunt for the index.
const INDEX_DIR: &str = "index";
/// File name of the manifest.
const MANIFEST_FILE: &str = "manifest.json";
/// File name of the stored config hash.
const CONFIG_HASH_FILE: &str = "config_hash";

/// Paths of one index and its bookkeeping files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPaths {
    /// Tantivy index directory.
    pub index_dir: PathBuf,
    /// JSON manifest of indexed files.
    pub manifest: PathBuf,
    /// Stored config hash.
    pub config_hash: PathBuf,
}

impl IndexPaths {
    /// Derives the bookkeeping paths for an index directory.
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        let index_dir = index_dir.into();
        let manifest = index_dir
            .parent()
            .unwrap_or(&index_dir)
            .join(MANIFEST_FILE);
        let config_hash = index_dir.join(CONFIG_HASH_FILE);
        Self {
            index_dir,
            manifest,
            config_hash,
        }
    }

    /// Resolves the paths for `config`, or `None` if no config file was found.
    pub fn for_config(config: &Config) -> Option<Self> {
        index_directory(config).map(Self::new)
    }

    /// Returns true if a Tantivy index exists in the index directory.
    pub fn index_exists(&self) -> bool {
        self.index_dir.join("meta.json").exists()
    }
}

/// Computes the index directory of `config`.
///
/// `config_root` normally names the directory of the winning `.hunt.toml`; a path to the
/// file itself is accepted too.
pub fn index_directory(config: &Config) -> Option<PathBuf> {
    let config_root = config.config_root.as_ref()?;
    let root_dir = match config_root.file_name() {
        Some(name) if name == CONFIG_FILENAME => {
            config_root.parent().unwrap_or(config_root.as_path())
        }
        _ => config_root.as_path(),
    };
    Some(root_dir.join(HUNT_DIR).join(INDEX_DIR))
}

/// Returns the global index directory (`~/.hunt/index/`).
pub fn global_index_directory() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(HUNT_DIR).join(INDEX_DIR))
}

/// Returns true if `path` lies inside a hunt data directory.
pub fn is_hunt_data(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == HUNT_DIR)
}
