//! Configuration system for hunt.
//!
//! hunt uses TOML configuration files named `.hunt.toml`. Configuration is resolved by walking
//! up the directory tree from the current working directory, collecting any `.hunt.toml` files
//! found, then loading `~/.hunt.toml` as the global config with lowest precedence.
//!
//! A configuration names the projects to index (`[project.NAME]`), optional working sets that
//! group projects under one name (`[working_set.NAME]`), and the `[index]` and `[search]`
//! preferences shared by the indexer and the query pipeline.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod patterns;
mod resolve;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawIndexSettings, RawProject, RawSearchSettings, RawWorkingSet, parse_config_file,
    parse_config_str,
};
pub use patterns::{FileFilter, normalize_extensions};
pub use resolve::resolve_project_path;
use serde::{Deserialize, Serialize};
pub use templates::{global_template, local_template};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Default list of indexable file extensions.
pub const DEFAULT_EXTENSIONS: &str = "java,xml,xsd,txt,jsp,css,c,cpp,h,hpp,mf,properties,php,php4,php5,js,inc,ini,sql,sqlj,pl,sh,bat,cmd,htm,html";

/// Default cap on indexed contents tokens per file.
pub const DEFAULT_MAX_TERMS_PER_DOC: usize = 200_000;

/// Top-level merged configuration for hunt.
///
/// This represents the fully resolved configuration after merging all discovered `.hunt.toml`
/// files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Indexing preferences.
    pub index: IndexSettings,
    /// Search preferences.
    pub search: SearchSettings,
    /// Resolved projects, sorted by name.
    pub projects: Vec<Project>,
    /// Working sets: name to member project names.
    pub working_sets: BTreeMap<String, Vec<String>>,
    /// Directory containing the most specific config file (determines index location).
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.hunt.toml` files.
    ///
    /// This is the main entry point for loading configuration. It:
    /// 1. Discovers all `.hunt.toml` files from `cwd` up to the filesystem root
    /// 2. Appends `~/.hunt.toml` if it exists
    /// 3. Parses each file
    /// 4. Merges them according to precedence rules (closest to `cwd` wins)
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    ///
    /// Returns `Ok(Config::default())` if the list is empty.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Builds the filter deciding which files of a project get indexed.
    ///
    /// Invalid exclusion patterns are logged and skipped.
    pub fn file_filter(&self) -> FileFilter {
        FileFilter::new(&self.index)
    }

    /// Looks up a project by name.
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Returns the member projects of a working set, if it is defined.
    pub fn working_set(&self, name: &str) -> Option<&[String]> {
        self.working_sets.get(name).map(Vec::as_slice)
    }

    /// Finds the project whose directory contains `path`.
    ///
    /// When project directories nest, the deepest one wins.
    pub fn project_for_path(&self, path: &Path) -> Option<&Project> {
        self.projects
            .iter()
            .filter(|p| path.starts_with(&p.path))
            .max_by_key(|p| p.path.components().count())
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for:
    /// - Project paths that don't exist or aren't directories
    /// - Exclusion patterns that don't compile
    /// - Working sets that name undefined projects
    /// - Empty configuration (no projects defined)
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// This outputs the merged preferences in the same format as a `.hunt.toml` file.
    /// Projects and working sets are not included since they carry resolved paths.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            index: self.index.clone(),
            search: self.search.clone(),
        };
        toml::to_string_pretty(&serializable).map_err(ConfigError::Serialize)
    }
}

/// Preferences controlling what gets indexed and how the index is maintained.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Indexable extensions, lowercase without leading dot. Empty or `*` means all files.
    pub extensions: Vec<String>,
    /// Whether files without an extension are indexed.
    pub index_empty_extension: bool,
    /// Whether archive attachments are indexed.
    pub index_archives: bool,
    /// Glob patterns for files to skip, matched against `/<project>/<relative path>`.
    pub exclude: Vec<String>,
    /// Interval between periodic index updates, in milliseconds.
    pub update_interval_ms: u64,
    /// Whether the periodic update job runs.
    pub update_enabled: bool,
    /// Maximum number of content terms indexed per document.
    pub max_terms_per_doc: usize,
    /// Minimum token length kept by the tokenizer chain.
    pub min_word_length: usize,
}

impl IndexSettings {
    /// Returns true when every extension is indexable.
    pub fn indexes_all_extensions(&self) -> bool {
        self.extensions.is_empty() || self.extensions.iter().any(|e| e == "*")
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            extensions: normalize_extensions(&[DEFAULT_EXTENSIONS.to_string()]),
            index_empty_extension: false,
            index_archives: false,
            exclude: Vec::new(),
            update_interval_ms: 60_000,
            update_enabled: true,
            max_terms_per_doc: DEFAULT_MAX_TERMS_PER_DOC,
            min_word_length: 1,
        }
    }
}

/// Search preferences.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of files shown per search.
    pub limit: usize,
    /// Whether a fuzzy attempt runs when exact and split attempts find nothing.
    pub fuzzy_auto: bool,
    /// Whether per-document match counts are computed.
    pub show_match_counts: bool,
    /// Whether searches run as the user types.
    pub incremental: bool,
    /// Debounce delay before an incremental search runs, in milliseconds.
    pub typing_delay_ms: u64,
    /// Minimum length of the last term before a prefix completion is added.
    pub prefix_min_length: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            limit: 25,
            fuzzy_auto: true,
            show_match_counts: true,
            incremental: true,
            typing_delay_ms: 200,
            prefix_min_length: 3,
        }
    }
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings {
    /// Indexing preferences.
    index: IndexSettings,
    /// Search preferences.
    search: SearchSettings,
}

/// A named project pointing to a directory of source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Name of the project (stored in the `proj` field of every document).
    pub name: String,
    /// Resolved absolute path to the project directory.
    pub path: PathBuf,
    /// Whether this project was defined in the global `~/.hunt.toml`.
    pub is_global: bool,
}
