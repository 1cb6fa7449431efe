//! Indexable-file filtering.
//!
//! Decides which files of a project are indexed: an extension allow-list (with a separate
//! switch for files without an extension) and a set of exclusion globs matched against the
//! workspace path `/<project>/<relative path>`.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;

use crate::{ConfigError, IndexSettings};

/// Separators accepted between entries of an extension list.
const EXTENSION_SEPARATORS: &[char] = &[',', '|', ';', ':'];

/// Normalizes extension list entries.
///
/// Each entry may itself be a delimited list. Entries are trimmed and lowercased, and a
/// leading `*` and `.` are stripped, so `*.Java` becomes `java`. A bare `*` is kept and
/// means "all extensions". The result is sorted and deduplicated.
pub fn normalize_extensions(values: &[String]) -> Vec<String> {
    let mut extensions: Vec<String> = values
        .iter()
        .flat_map(|v| v.split(EXTENSION_SEPARATORS))
        .map(str::trim)
        .filter_map(|entry| {
            if entry == "*" {
                return Some(entry.to_string());
            }
            let entry = entry.strip_prefix('*').unwrap_or(entry);
            let entry = entry.strip_prefix('.').unwrap_or(entry);
            (!entry.is_empty()).then(|| entry.to_lowercase())
        })
        .collect();
    extensions.sort();
    extensions.dedup();
    extensions
}

/// Compiled file filter for one configuration.
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// Allowed extensions, or `None` when every extension is indexable.
    extensions: Option<Vec<String>>,
    /// Whether files without an extension pass.
    index_empty_extension: bool,
    /// Compiled exclusion patterns.
    exclude: GlobSet,
}

impl FileFilter {
    /// Builds a filter from index settings.
    ///
    /// A pattern that fails to compile is logged and skipped; the remaining patterns still
    /// apply.
    pub fn new(settings: &IndexSettings) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in &settings.exclude {
            match compile_glob(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!(%pattern, error = %e, "skipping invalid exclusion pattern"),
            }
        }
        let exclude = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "exclusion patterns could not be combined, excluding nothing");
            GlobSet::empty()
        });

        let extensions =
            (!settings.indexes_all_extensions()).then(|| settings.extensions.clone());

        Self {
            extensions,
            index_empty_extension: settings.index_empty_extension,
            exclude,
        }
    }

    /// Returns true if a file with this extension is indexable.
    ///
    /// `None` or an empty string means the file has no extension.
    pub fn is_indexable_extension(&self, ext: Option<&str>) -> bool {
        let Some(allowed) = &self.extensions else {
            return true;
        };
        match ext {
            None | Some("") => self.index_empty_extension,
            Some(ext) => allowed
                .binary_search(&ext.to_lowercase())
                .is_ok(),
        }
    }

    /// Returns true if the file at `rel_path` inside `project` matches an exclusion pattern.
    pub fn is_excluded(&self, project: &str, rel_path: &Path) -> bool {
        self.exclude
            .is_match(workspace_path(project, rel_path, false))
    }

    /// Returns true if every file below the directory would be excluded, so the walk can skip it.
    pub fn is_excluded_dir(&self, project: &str, rel_dir: &Path) -> bool {
        self.exclude.is_match(workspace_path(project, rel_dir, true))
    }

    /// Returns true if the file should be indexed.
    pub fn accepts(&self, project: &str, rel_path: &Path) -> bool {
        let ext = rel_path.extension().and_then(|e| e.to_str());
        self.is_indexable_extension(ext) && !self.is_excluded(project, rel_path)
    }
}

/// Formats `/<project>/<relative path>` with forward slashes.
fn workspace_path(project: &str, rel_path: &Path, trailing_slash: bool) -> String {
    let rel = rel_path.to_string_lossy().replace('\\', "/");
    let mut path = format!("/{project}/{}", rel.trim_start_matches('/'));
    if trailing_slash && !path.ends_with('/') {
        path.push('/');
    }
    path
}

/// Compiles a single exclusion glob. `*` never crosses a `/`.
fn compile_glob(pattern: &str) -> Result<globset::Glob, ConfigError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Checks that a pattern compiles, for validation.
pub(crate) fn check_pattern(pattern: &str) -> Result<(), ConfigError> {
    compile_glob(pattern).map(|_| ())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn settings(extensions: &str, exclude: &[&str]) -> IndexSettings {
        IndexSettings {
            extensions: normalize_extensions(&[extensions.to_string()]),
            exclude: exclude.iter().map(|s| (*s).to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_extensions() {
        let exts = normalize_extensions(&["*.Java, .xml;txt|sql:".to_string()]);
        assert_eq!(exts, vec!["java", "sql", "txt", "xml"]);
    }

    #[test]
    fn test_normalize_keeps_star() {
        assert_eq!(normalize_extensions(&["*".to_string()]), vec!["*"]);
    }

    #[test]
    fn test_extension_allow_list() {
        let filter = FileFilter::new(&settings("java,xml", &[]));
        assert!(filter.is_indexable_extension(Some("java")));
        assert!(filter.is_indexable_extension(Some("XML")));
        assert!(!filter.is_indexable_extension(Some("class")));
        assert!(!filter.is_indexable_extension(None));
    }

    #[test]
    fn test_empty_extension_flag() {
        let mut s = settings("java", &[]);
        s.index_empty_extension = true;
        let filter = FileFilter::new(&s);
        assert!(filter.is_indexable_extension(None));
        assert!(filter.is_indexable_extension(Some("")));
    }

    #[test]
    fn test_all_extensions() {
        let filter = FileFilter::new(&settings("*", &[]));
        assert!(filter.is_indexable_extension(Some("anything")));
        assert!(filter.is_indexable_extension(None));

        let filter = FileFilter::new(&settings("", &[]));
        assert!(filter.is_indexable_extension(Some("bin")));
    }

    #[test]
    fn test_exclusion_globs() {
        let filter = FileFilter::new(&settings("java", &["**/target/**", "/core/gen/*.java"]));

        assert!(filter.is_excluded("core", Path::new("target/classes/A.java")));
        assert!(filter.is_excluded("api", Path::new("module/target/B.java")));
        assert!(filter.is_excluded("core", Path::new("gen/Parser.java")));
        // `*` does not cross directories.
        assert!(!filter.is_excluded("core", Path::new("gen/deep/Parser.java")));
        assert!(!filter.is_excluded("api", Path::new("gen/Parser.java")));
        assert!(!filter.is_excluded("core", Path::new("src/Main.java")));
    }

    #[test]
    fn test_excluded_directory_pruning() {
        let filter = FileFilter::new(&settings("java", &["**/target/**"]));
        assert!(filter.is_excluded_dir("core", Path::new("target")));
        assert!(!filter.is_excluded_dir("core", Path::new("src")));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let filter = FileFilter::new(&settings("java", &["a[", "**/build/**"]));
        assert!(filter.is_excluded("core", Path::new("build/A.java")));
        assert!(!filter.is_excluded("core", Path::new("src/A.java")));
    }

    #[test]
    fn test_question_mark_matches_one_character() {
        let filter = FileFilter::new(&settings("java", &["/core/v?/**"]));
        assert!(filter.is_excluded("core", Path::new("v1/A.java")));
        assert!(!filter.is_excluded("core", Path::new("v10/A.java")));
    }

    #[test]
    fn test_accepts_combines_both() {
        let filter = FileFilter::new(&settings("java", &["**/target/**"]));
        assert!(filter.accepts("core", Path::new("src/Main.java")));
        assert!(!filter.accepts("core", Path::new("src/Main.class")));
        assert!(!filter.accepts("core", Path::new("target/Main.java")));
    }
}
