//! Implementation of `hunt projects`.

use std::process::ExitCode;

use crate::cli::{context::CommandContext, output::print_list};

/// Lists the projects that have files in the index.
pub fn run(ctx: &mut CommandContext) -> ExitCode {
    let searcher = match ctx.searcher() {
        Ok(searcher) => searcher,
        Err(code) => return code,
    };
    match searcher.index_projects() {
        Ok(projects) => {
            print_list(&projects, "No indexed projects.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
