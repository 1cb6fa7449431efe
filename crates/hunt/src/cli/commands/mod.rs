//! Command implementations and dispatch.

pub mod config;
pub mod delete;
pub mod durations;
pub mod index;
pub mod init;
pub mod interactive;
pub mod projects;
pub mod search;
pub mod status;
pub mod terms;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &mut CommandContext) -> ExitCode {
    match command {
        Commands::Init(cmd) => init::run(ctx, &cmd),
        Commands::Index => index::run_build(ctx),
        Commands::Update => index::run_update(ctx),
        Commands::Search(cmd) => search::run(ctx, &cmd),
        Commands::Terms(cmd) => terms::run(ctx, &cmd),
        Commands::Projects => projects::run(ctx),
        Commands::Durations => durations::run(),
        Commands::Delete { what } => delete::run(ctx, &what),
        Commands::Status => status::run(ctx),
        Commands::Config => config::run(ctx),
        Commands::Interactive(cmd) => interactive::run(ctx, &cmd),
    }
}
