//! Implementation of `hunt index` and `hunt update`.

use std::process::ExitCode;

use hunt_index::{IndexError, IndexJobs, IndexStats};

use crate::cli::{
    context::CommandContext,
    output::{ConsoleReporter, print_index_stats},
};

/// Rebuilds the index from scratch.
pub fn run_build(ctx: &mut CommandContext) -> ExitCode {
    run_job(ctx, |jobs, reporter| jobs.build(reporter))
}

/// Brings the index up to date with the files on disk.
pub fn run_update(ctx: &mut CommandContext) -> ExitCode {
    run_job(ctx, |jobs, reporter| jobs.update(reporter))
}

/// Runs an indexing job with console progress and prints its summary.
fn run_job(
    ctx: &mut CommandContext,
    job: impl FnOnce(&IndexJobs, &mut ConsoleReporter) -> Result<IndexStats, IndexError>,
) -> ExitCode {
    let jobs = match ctx.jobs() {
        Ok(jobs) => jobs,
        Err(code) => return code,
    };
    let mut reporter = if ctx.verbose {
        ConsoleReporter::verbose()
    } else {
        ConsoleReporter::quiet()
    };
    match job(&jobs, &mut reporter) {
        Ok(stats) => {
            print_index_stats(&stats);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: indexing failed: {e}");
            ExitCode::FAILURE
        }
    }
}
