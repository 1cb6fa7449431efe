//! Configuration file parsing.
//!
//! Parses individual `.hunt.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
/// This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Indexing section.
    pub index: Option<RawIndexSettings>,
    /// Search section.
    pub search: Option<RawSearchSettings>,
    /// Project definitions: name -> project.
    pub project: Option<HashMap<String, RawProject>>,
    /// Working set definitions: name -> members.
    pub working_set: Option<HashMap<String, RawWorkingSet>>,
}

/// Raw project definition from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProject {
    /// Path to the project directory.
    pub path: String,
}

/// Raw working set definition from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkingSet {
    /// Names of member projects.
    pub projects: Vec<String>,
}

/// Raw indexing settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawIndexSettings {
    /// Indexable extensions, as a delimited string or an array.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub extensions: Option<Vec<String>>,
    /// Index files without an extension.
    pub index_empty_extension: Option<bool>,
    /// Index archive attachments.
    pub index_archives: Option<bool>,
    /// Exclusion glob patterns.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub exclude: Option<Vec<String>>,
    /// Periodic update interval in milliseconds.
    pub update_interval_ms: Option<u64>,
    /// Whether periodic updates run.
    pub update_enabled: Option<bool>,
    /// Maximum content terms per document.
    pub max_terms_per_doc: Option<usize>,
    /// Minimum token length.
    pub min_word_length: Option<usize>,
}

/// Raw search settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Number of files shown.
    pub limit: Option<usize>,
    /// Automatic fuzzy fallback.
    pub fuzzy_auto: Option<bool>,
    /// Compute match counts.
    pub show_match_counts: Option<bool>,
    /// Search while typing.
    pub incremental: Option<bool>,
    /// Debounce delay in milliseconds.
    pub typing_delay_ms: Option<u64>,
    /// Minimum length for prefix completion.
    pub prefix_min_length: Option<usize>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for merging.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    parse_config_file(path).is_ok_and(|config| config.root == Some(true))
}
