//! Implementation of `hunt status`.

use std::{path::Path, process::ExitCode};

use hunt_config::{ConfigWarning, discover_config_files};
use hunt_index::{IndexPaths, IndexStatus, Manifest, detect_index_status};

use crate::cli::{
    context::CommandContext,
    output::{dim, header, warning},
};

/// Shows configuration files, projects, index status, and validation warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let cwd = &ctx.cwd;

    let config_files = discover_config_files(cwd);
    if config_files.is_empty() {
        println!("{}", dim("No configuration files found."));
        println!();
        println!("Run {} to create a configuration file.", header("hunt init"));
        return ExitCode::SUCCESS;
    }

    println!("{}", header("Config files:"));
    for path in &config_files {
        println!("   {}", display_path(path, Some(cwd)));
    }
    println!();

    let config = &ctx.config;

    println!("{}", header("Projects:"));
    if config.projects.is_empty() {
        println!("   {}", dim("(none defined)"));
    }
    for project in &config.projects {
        let scope = if project.is_global { "global" } else { "local" };
        let base = if project.is_global {
            None
        } else {
            config.config_root.as_deref()
        };
        let mut line = format!(
            "   {} {} {}",
            project.name,
            dim(&format!("({scope})")),
            dim(&format!("-> {}", display_path(&project.path, base)))
        );
        if !project.path.exists() {
            line.push(' ');
            line.push_str(&warning("[missing]"));
        }
        println!("{line}");
    }
    println!();

    if !config.working_sets.is_empty() {
        println!("{}", header("Working sets:"));
        for (name, members) in &config.working_sets {
            println!("   {name} {}", dim(&format!("= {}", members.join(", "))));
        }
        println!();
    }

    print_index(ctx);

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }

    println!("{}", header(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("   {}", warning(&w.to_string()));
    }
    println!();

    print_hints(&warnings);

    ExitCode::FAILURE
}

/// Prints where the index lives, whether it is current and how many files it holds.
fn print_index(ctx: &CommandContext) {
    let config = &ctx.config;
    let status = detect_index_status(config);
    println!("{}", header("Index:"));
    let Some(paths) = IndexPaths::for_config(config) else {
        println!("   {}", status.description());
        println!();
        return;
    };
    println!(
        "   {} {}",
        status.description(),
        dim(&format!("({})", paths.index_dir.display()))
    );
    if status != IndexStatus::Missing {
        match Manifest::load(&paths.manifest) {
            Ok(manifest) => println!("   {} files", manifest.len()),
            Err(e) => println!("   {}", warning(&format!("unreadable manifest: {e}"))),
        }
    }
    let index = &config.index;
    if index.update_enabled && index.update_interval_ms > 0 {
        println!(
            "   {}",
            dim(&format!(
                "periodic update every {}s in interactive sessions",
                index.update_interval_ms / 1000
            ))
        );
    }
    println!();
}

/// Shows `path` relative to `base` when it lies inside it.
fn display_path(path: &Path, base: Option<&Path>) -> String {
    base.and_then(|base| path.strip_prefix(base).ok())
        .map_or_else(
            || path.display().to_string(),
            |rel| {
                if rel.as_os_str().is_empty() {
                    ".".to_string()
                } else {
                    format!("./{}", rel.display())
                }
            },
        )
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    for w in warnings {
        let hint = match w {
            ConfigWarning::NoProjectsDefined => "add [project.NAME] sections to .hunt.toml",
            ConfigWarning::ProjectPathMissing { .. } => "check the path of the project",
            ConfigWarning::InvalidExcludePattern { .. } => {
                "fix the pattern in [index] exclude; it is ignored until then"
            }
            ConfigWarning::UnknownWorkingSetProject { .. } => {
                "define the project or remove it from the working set"
            }
        };
        println!("{}", dim(&format!("Hint: {hint}")));
    }
}
