//! Implementation of `hunt search`.

use std::process::ExitCode;

use hunt_index::{Field, SearchQuery};

use crate::cli::{
    args::{ScopeArgs, SearchCommand},
    context::CommandContext,
    output::{ResultOptions, dim, output_results},
};

/// Searches the index and prints the matching files.
pub fn run(ctx: &mut CommandContext, cmd: &SearchCommand) -> ExitCode {
    let mut query = build_query(ctx, cmd.query_text(), &cmd.scope);
    query.set_exact(!cmd.no_exact);
    query.set_fuzzy(cmd.fuzzy);

    if cmd.explain {
        return explain(ctx, &query);
    }

    let searcher = match ctx.searcher() {
        Ok(searcher) => searcher,
        Err(code) => return code,
    };
    match searcher.search(&mut query) {
        Ok(result) => output_results(
            &ctx.config,
            &query,
            result.as_ref(),
            ResultOptions {
                counts: cmd.counts,
                lines: cmd.lines,
                json: cmd.json,
            },
        ),
        Err(e) => {
            eprintln!("error: search failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Builds a query for `text` with the scope flags applied.
///
/// Without `--current-project`, `.` stands for the project containing the working
/// directory.
pub fn build_query(ctx: &CommandContext, text: String, scope: &ScopeArgs) -> SearchQuery {
    let limit = scope.limit.unwrap_or(ctx.config.search.limit);
    let mut query = SearchQuery::new(text, Some(limit));
    query.restrict(Field::Proj, scope.projects.iter().cloned());
    query.restrict(
        Field::Ext,
        scope
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase()),
    );
    query.set_current_project(
        scope
            .current_project
            .clone()
            .or_else(|| ctx.cwd_project()),
    );
    query
}

/// Prints the clause tree the first attempt of `query` would run.
fn explain(ctx: &mut CommandContext, query: &SearchQuery) -> ExitCode {
    let searcher = match ctx.searcher_as_is() {
        Ok(searcher) => searcher,
        Err(code) => return code,
    };
    match searcher.explain(query) {
        Ok(Some(clause)) => {
            println!("{clause}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("{}", dim("(matches nothing)"));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
