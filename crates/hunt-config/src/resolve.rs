//! Path resolution for project definitions.
//!
//! Resolves relative and tilde-prefixed project paths to absolute paths.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

/// Resolves a project path to an absolute path.
///
/// Handles three cases:
/// - Tilde paths (`~/src/app`) - expanded to home directory
/// - Relative paths (`./core`, `../shared`) - resolved relative to `config_dir`
/// - Absolute paths (`/work/app`) - returned as-is
///
/// Existing paths are canonicalized and must be directories. A path that does not exist is
/// returned unresolved so validation can report it instead of failing the whole load.
pub fn resolve_project_path(path: &str, config_dir: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(path)?;

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(&expanded)
    };

    if !absolute.exists() {
        return Ok(absolute);
    }

    let canonical = absolute
        .canonicalize()
        .map_err(|source| ConfigError::PathResolution {
            path: absolute.clone(),
            source,
        })?;

    if !canonical.is_dir() {
        return Err(ConfigError::ProjectPathNotDirectory { path: canonical });
    }

    Ok(canonical)
}

/// Expands a tilde prefix to the home directory.
///
/// - `~` alone becomes the home directory
/// - `~/foo` becomes home directory joined with `foo`
/// - Paths not starting with `~` are returned unchanged
fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return home_dir();
    }

    match path.strip_prefix("~/") {
        Some(rest) => Ok(home_dir()?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}

/// Returns the home directory.
fn home_dir() -> Result<PathBuf, ConfigError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDirectory)
}
