//! `hunt`: code-aware full-text search over project source trees.
//!
//! Projects configured in `.hunt.toml` are indexed into a local tantivy index next to the
//! configuration. Searches fall back from the literal text to split identifiers and then
//! to fuzzy matching until something is found.

mod cli;

use std::{io, process::ExitCode};

use tracing_subscriber::EnvFilter;

use crate::cli::{
    CommandContext,
    args::{Commands, parse_cli},
    commands,
};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "HUNT_LOG";

/// Installs the stderr log subscriber.
///
/// `HUNT_LOG` takes a tracing filter directive; without it only warnings are shown, or
/// debug output with `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = parse_cli();
    init_logging(cli.verbose);

    let context = match cli.command {
        Commands::Init(_) => CommandContext::load_cwd_only(),
        _ => CommandContext::load(),
    };
    let mut ctx = match context {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    ctx.verbose = cli.verbose;

    commands::run(cli.command, &mut ctx)
}
