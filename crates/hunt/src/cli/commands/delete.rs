//! Implementation of `hunt delete`.

use std::{fs, path::PathBuf, process::ExitCode};

use hunt_index::{IndexError, IndexJobs};

use crate::cli::{args::DeleteWhat, context::CommandContext, output::success};

/// Removes the whole index, a file, a folder or a project from the index.
pub fn run(ctx: &mut CommandContext, what: &DeleteWhat) -> ExitCode {
    let jobs = match ctx.jobs() {
        Ok(jobs) => jobs,
        Err(code) => return code,
    };

    let (result, done) = match what {
        DeleteWhat::Index => (jobs.delete_index(), "Deleted index".to_string()),
        DeleteWhat::File { path } => {
            let Some(indexed) = indexed_path(ctx, &jobs, path) else {
                return not_in_project(path);
            };
            (jobs.delete_file(&indexed), format!("Removed {indexed}"))
        }
        DeleteWhat::Folder { path } => {
            let Some(indexed) = indexed_path(ctx, &jobs, path) else {
                return not_in_project(path);
            };
            (jobs.delete_folder(&indexed), format!("Removed {indexed}/"))
        }
        DeleteWhat::Project { name } => {
            if ctx.config.project(name).is_none() {
                eprintln!("error: unknown project: {name}");
                return ExitCode::FAILURE;
            }
            (jobs.delete_project(name), format!("Removed project {name}"))
        }
    };

    report(result, &done)
}

/// Maps a path argument to its indexed form.
///
/// Relative paths are taken from the working directory; `/<project>/...` names an indexed
/// path directly.
fn indexed_path(ctx: &CommandContext, jobs: &IndexJobs, path: &str) -> Option<String> {
    let joined: PathBuf = ctx.cwd.join(path);
    let indexer = jobs.indexer();
    indexer.index_path_for(&joined).or_else(|| {
        fs::canonicalize(&joined)
            .ok()
            .and_then(|canonical| indexer.index_path_for(&canonical))
    })
}

/// Reports a path outside every project.
fn not_in_project(path: &str) -> ExitCode {
    eprintln!("error: {path} is not inside a configured project");
    ExitCode::FAILURE
}

/// Prints the outcome of a delete job.
fn report(result: Result<(), IndexError>, done: &str) -> ExitCode {
    match result {
        Ok(()) => {
            println!("{}", success(done));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: delete failed: {e}");
            ExitCode::FAILURE
        }
    }
}
