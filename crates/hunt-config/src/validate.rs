//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use crate::{Config, patterns::check_pattern};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A project path does not exist.
    ProjectPathMissing {
        /// Name of the project.
        project: String,
        /// Path that doesn't exist.
        path: String,
    },
    /// An exclusion pattern does not compile and is ignored.
    InvalidExcludePattern {
        /// The pattern.
        pattern: String,
        /// Why it failed.
        reason: String,
    },
    /// A working set names a project that is not defined.
    UnknownWorkingSetProject {
        /// Name of the working set.
        working_set: String,
        /// The undefined project.
        project: String,
    },
    /// No projects are defined.
    NoProjectsDefined,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectPathMissing { project, path } => {
                write!(f, "project '{project}' path does not exist: {path}")
            }
            Self::InvalidExcludePattern { pattern, reason } => {
                write!(f, "exclude pattern '{pattern}' is ignored: {reason}")
            }
            Self::UnknownWorkingSetProject {
                working_set,
                project,
            } => {
                write!(
                    f,
                    "working set '{working_set}' names undefined project '{project}'"
                )
            }
            Self::NoProjectsDefined => write!(f, "no projects are defined in configuration"),
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    if config.projects.is_empty() {
        return vec![ConfigWarning::NoProjectsDefined];
    }

    let mut warnings: Vec<ConfigWarning> = config
        .projects
        .iter()
        .filter(|p| !p.path.is_dir())
        .map(|p| ConfigWarning::ProjectPathMissing {
            project: p.name.clone(),
            path: p.path.display().to_string(),
        })
        .collect();

    for pattern in &config.index.exclude {
        if let Err(e) = check_pattern(pattern) {
            warnings.push(ConfigWarning::InvalidExcludePattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    for (name, members) in &config.working_sets {
        for member in members {
            if config.project(member).is_none() {
                warnings.push(ConfigWarning::UnknownWorkingSetProject {
                    working_set: name.clone(),
                    project: member.clone(),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{IndexSettings, Project};

    fn project(name: &str, path: PathBuf) -> Project {
        Project {
            name: name.into(),
            path,
            is_global: false,
        }
    }

    #[test]
    fn test_validate_empty_config() {
        let warnings = Config::default().validate();
        assert_eq!(warnings, vec![ConfigWarning::NoProjectsDefined]);
    }

    #[test]
    fn test_validate_missing_project_path() {
        let config = Config {
            projects: vec![project("core", PathBuf::from("/nonexistent/path/12345"))],
            ..Default::default()
        };

        let warnings = config.validate();
        assert!(warnings.iter().any(
            |w| matches!(w, ConfigWarning::ProjectPathMissing { project, .. } if project == "core")
        ));
    }

    #[test]
    fn test_validate_clean_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            projects: vec![project("core", tmp.path().to_path_buf())],
            ..Default::default()
        };
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_bad_pattern_and_working_set() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config {
            projects: vec![project("core", tmp.path().to_path_buf())],
            index: IndexSettings {
                exclude: vec!["src/[".into(), "**/target/**".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        config
            .working_sets
            .insert("backend".into(), vec!["core".into(), "api".into()]);

        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            &warnings[0],
            ConfigWarning::InvalidExcludePattern { pattern, .. } if pattern == "src/["
        ));
        assert_eq!(
            warnings[1],
            ConfigWarning::UnknownWorkingSetProject {
                working_set: "backend".into(),
                project: "api".into(),
            }
        );
    }

    #[test]
    fn test_warning_display() {
        let warning = ConfigWarning::ProjectPathMissing {
            project: "core".into(),
            path: "/some/path".into(),
        };
        assert_eq!(
            warning.to_string(),
            "project 'core' path does not exist: /some/path"
        );
        assert_eq!(
            ConfigWarning::NoProjectsDefined.to_string(),
            "no projects are defined in configuration"
        );
    }
}
