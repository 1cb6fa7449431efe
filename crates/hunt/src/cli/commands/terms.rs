//! Implementation of `hunt terms`.

use std::process::ExitCode;

use hunt_index::Field;

use crate::cli::{args::TermsCommand, context::CommandContext, output::print_list};

/// Lists the indexed values of a field that start with a prefix.
pub fn run(ctx: &mut CommandContext, cmd: &TermsCommand) -> ExitCode {
    let field = match cmd.field.as_deref() {
        None => Field::Contents,
        Some(name) => match Field::by_name(name).or_else(|| Field::by_alias(name)) {
            Some(field) => field,
            None => {
                eprintln!("error: unknown field: {name}");
                return ExitCode::FAILURE;
            }
        },
    };

    let searcher = match ctx.searcher() {
        Ok(searcher) => searcher,
        Err(code) => return code,
    };
    match searcher.proposals(&cmd.prefix, field) {
        Ok(terms) => {
            print_list(&terms, "No matching terms.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
