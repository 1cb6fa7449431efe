//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules and resolving paths.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    Config, ConfigError, IndexSettings, Project, SearchSettings,
    discovery::is_global_config,
    parse::{RawConfig, RawIndexSettings, RawSearchSettings},
    patterns::normalize_extensions,
    resolve::resolve_project_path,
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

impl ParsedConfig {
    /// Directory holding the config file.
    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config).
///
/// Merge rules:
/// - Scalar settings: first defined value wins (highest precedence)
/// - Projects and working sets: merged by name, first definition wins completely
/// - With no projects defined anywhere, the closest config directory becomes the single
///   project, named after that directory
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    let Some(closest) = configs.first() else {
        return Ok(Config::default());
    };
    let config_root = closest.dir().to_path_buf();

    let mut projects = merge_projects(configs)?;
    if projects.is_empty() {
        projects.push(implicit_project(closest)?);
    }

    Ok(Config {
        index: merge_index_settings(configs),
        search: merge_search_settings(configs),
        projects,
        working_sets: merge_working_sets(configs),
        config_root: Some(config_root),
    })
}

/// Merges index settings, taking first defined value for each field.
fn merge_index_settings(configs: &[ParsedConfig]) -> IndexSettings {
    let mut result = IndexSettings::default();

    // Lowest precedence first so closer files overwrite.
    for parsed in configs.iter().rev() {
        if let Some(ref index) = parsed.config.index {
            apply_raw_index(&mut result, index);
        }
    }

    result
}

/// Applies raw index settings to result, overwriting any present values.
fn apply_raw_index(result: &mut IndexSettings, raw: &RawIndexSettings) {
    if let Some(ref v) = raw.extensions {
        result.extensions = normalize_extensions(v);
    }
    if let Some(v) = raw.index_empty_extension {
        result.index_empty_extension = v;
    }
    if let Some(v) = raw.index_archives {
        result.index_archives = v;
    }
    if let Some(ref v) = raw.exclude {
        result.exclude = v.clone();
    }
    if let Some(v) = raw.update_interval_ms {
        result.update_interval_ms = v;
    }
    if let Some(v) = raw.update_enabled {
        result.update_enabled = v;
    }
    if let Some(v) = raw.max_terms_per_doc {
        result.max_terms_per_doc = v;
    }
    if let Some(v) = raw.min_word_length {
        result.min_word_length = v.max(1);
    }
}

/// Merges search settings.
fn merge_search_settings(configs: &[ParsedConfig]) -> SearchSettings {
    let mut result = SearchSettings::default();

    for parsed in configs.iter().rev() {
        if let Some(ref search) = parsed.config.search {
            apply_raw_search(&mut result, search);
        }
    }

    result
}

/// Applies raw search settings to result.
fn apply_raw_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(v) = raw.limit {
        result.limit = v;
    }
    if let Some(v) = raw.fuzzy_auto {
        result.fuzzy_auto = v;
    }
    if let Some(v) = raw.show_match_counts {
        result.show_match_counts = v;
    }
    if let Some(v) = raw.incremental {
        result.incremental = v;
    }
    if let Some(v) = raw.typing_delay_ms {
        result.typing_delay_ms = v;
    }
    if let Some(v) = raw.prefix_min_length {
        result.prefix_min_length = v;
    }
}

/// Merges projects from all configs, resolving paths.
///
/// `is_global` is determined by whether the source config file is `~/.hunt.toml`.
fn merge_projects(configs: &[ParsedConfig]) -> Result<Vec<Project>, ConfigError> {
    let mut seen: HashMap<String, Project> = HashMap::new();

    for parsed in configs {
        let Some(ref projects) = parsed.config.project else {
            continue;
        };
        let is_global = is_global_config(&parsed.path);

        for (name, raw) in projects {
            if seen.contains_key(name) {
                continue;
            }
            let path = resolve_project_path(&raw.path, parsed.dir())?;
            seen.insert(
                name.clone(),
                Project {
                    name: name.clone(),
                    path,
                    is_global,
                },
            );
        }
    }

    let mut projects: Vec<Project> = seen.into_values().collect();
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(projects)
}

/// Builds the single project used when no config defines one.
fn implicit_project(closest: &ParsedConfig) -> Result<Project, ConfigError> {
    let path = resolve_project_path(".", closest.dir())?;
    let name = path
        .file_name()
        .map_or_else(|| "root".to_string(), |n| n.to_string_lossy().into_owned());
    debug!(%name, path = %path.display(), "using config directory as the only project");
    Ok(Project {
        name,
        path,
        is_global: is_global_config(&closest.path),
    })
}

/// Merges working sets by name, first definition wins.
fn merge_working_sets(configs: &[ParsedConfig]) -> BTreeMap<String, Vec<String>> {
    let mut result = BTreeMap::new();
    for parsed in configs {
        let Some(ref sets) = parsed.config.working_set else {
            continue;
        };
        for (name, raw) in sets {
            result
                .entry(name.clone())
                .or_insert_with(|| raw.projects.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse::parse_config_str, test_support::TestDir};

    fn parsed(path: PathBuf, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path,
            config: parse_config_str(toml, Path::new("test")).unwrap(),
        }
    }

    #[test]
    fn test_merge_empty_configs() {
        let result = merge_configs(&[]).unwrap();
        assert_eq!(result.search.limit, 25);
        assert!(result.projects.is_empty());
        assert!(result.config_root.is_none());
    }

    #[test]
    fn test_merge_single_config() {
        let test_dir = TestDir::new();
        test_dir.create_dir("core");

        let config = merge_configs(&[parsed(
            test_dir.path().join(".hunt.toml"),
            r#"
[search]
limit = 10

[project.core]
path = "./core"
"#,
        )])
        .unwrap();

        assert_eq!(config.search.limit, 10);
        assert_eq!(config.projects.len(), 1);
        assert_eq!(config.projects[0].name, "core");
        assert!(!config.projects[0].is_global);
        assert_eq!(config.config_root.as_deref(), Some(test_dir.path()));
    }

    #[test]
    fn test_scalar_precedence_closest_wins() {
        let test_dir = TestDir::new();
        let inner = test_dir.create_dir("inner");

        let config = merge_configs(&[
            parsed(
                inner.join(".hunt.toml"),
                "[search]\nlimit = 5\n[index]\nextensions = \"rs\"\n",
            ),
            parsed(
                test_dir.path().join(".hunt.toml"),
                "[search]\nlimit = 99\nfuzzy_auto = false\n",
            ),
        ])
        .unwrap();

        assert_eq!(config.search.limit, 5);
        assert!(!config.search.fuzzy_auto);
        assert_eq!(config.index.extensions, vec!["rs"]);
    }

    #[test]
    fn test_projects_first_definition_wins() {
        let test_dir = TestDir::new();
        let near = test_dir.create_dir("near");
        test_dir.create_dir("far");

        let config = merge_configs(&[
            parsed(
                test_dir.path().join("a.toml"),
                "[project.app]\npath = \"./near\"\n",
            ),
            parsed(
                test_dir.path().join("b.toml"),
                "[project.app]\npath = \"./far\"\n[project.lib]\npath = \"./far\"\n",
            ),
        ])
        .unwrap();

        let names: Vec<_> = config.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["app", "lib"]);
        assert_eq!(config.projects[0].path, near.canonicalize().unwrap());
    }

    #[test]
    fn test_implicit_project_from_config_dir() {
        let test_dir = TestDir::new();
        let workspace = test_dir.create_dir("workspace");

        let config = merge_configs(&[parsed(workspace.join(".hunt.toml"), "")]).unwrap();

        assert_eq!(config.projects.len(), 1);
        assert_eq!(config.projects[0].name, "workspace");
        assert_eq!(config.projects[0].path, workspace.canonicalize().unwrap());
    }

    #[test]
    fn test_working_sets_merge_by_name() {
        let test_dir = TestDir::new();
        let config = merge_configs(&[
            parsed(
                test_dir.path().join("a.toml"),
                "[working_set.backend]\nprojects = [\"core\"]\n",
            ),
            parsed(
                test_dir.path().join("b.toml"),
                "[working_set.backend]\nprojects = [\"other\"]\n[working_set.ui]\nprojects = [\"web\"]\n",
            ),
        ])
        .unwrap();

        assert_eq!(config.working_set("backend"), Some(&["core".to_string()][..]));
        assert_eq!(config.working_set("ui"), Some(&["web".to_string()][..]));
    }

    #[test]
    fn test_min_word_length_never_zero() {
        let test_dir = TestDir::new();
        let config = merge_configs(&[parsed(
            test_dir.path().join(".hunt.toml"),
            "[index]\nmin_word_length = 0\n",
        )])
        .unwrap();
        assert_eq!(config.index.min_word_length, 1);
    }
}
