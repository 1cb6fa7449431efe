//! Implementation of `hunt interactive`.
//!
//! Each line read from stdin is treated as the current contents of a search box. With
//! incremental search enabled, lines go through the debounced search scheduler, so a line
//! superseded within the typing delay is never searched or printed. Otherwise every line is
//! searched in turn.

use std::{
    io::{self, BufRead},
    process::ExitCode,
    sync::{Arc, mpsc::Receiver},
    thread::{self, JoinHandle},
    time::Duration,
};

use hunt_config::Config;
use hunt_index::{SearchOutcome, SearchScheduler, Searcher};
use tracing::warn;

use super::search::build_query;
use crate::cli::{
    args::InteractiveCommand,
    context::CommandContext,
    output::{ResultOptions, header, output_results},
};

/// Runs searches for query lines read from stdin until end of input.
pub fn run(ctx: &mut CommandContext, cmd: &InteractiveCommand) -> ExitCode {
    let searcher = match ctx.searcher() {
        Ok(searcher) => searcher,
        Err(code) => return code,
    };
    let jobs = match ctx.jobs() {
        Ok(jobs) => jobs,
        Err(code) => return code,
    };
    let periodic = if cmd.no_update {
        None
    } else {
        jobs.start_periodic_update()
    };

    let options = ResultOptions {
        counts: ctx.config.search.show_match_counts,
        ..ResultOptions::default()
    };
    let code = if ctx.config.search.incremental {
        let delay = Duration::from_millis(cmd.delay.unwrap_or(ctx.config.search.typing_delay_ms));
        run_debounced(ctx, cmd, searcher, delay, options)
    } else {
        run_sequential(ctx, cmd, &searcher, options)
    };

    if let Some(periodic) = periodic {
        periodic.stop();
    }
    code
}

/// Schedules every line and prints whatever outlives the typing delay.
fn run_debounced(
    ctx: &CommandContext,
    cmd: &InteractiveCommand,
    searcher: Arc<Searcher>,
    delay: Duration,
    options: ResultOptions,
) -> ExitCode {
    let (scheduler, outcomes) = SearchScheduler::new(searcher);
    let printer = spawn_printer(ctx.config.clone(), outcomes, options);

    let mut pending = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("error: failed to read input: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            scheduler.cancel();
            continue;
        }
        let query = build_query(ctx, line, &cmd.scope);
        pending.push(scheduler.schedule(query, delay));
        pending.retain(|handle: &JoinHandle<()>| !handle.is_finished());
    }

    for handle in pending {
        if handle.join().is_err() {
            warn!("search thread panicked");
        }
    }
    drop(scheduler);
    match printer.join() {
        Ok(code) => code,
        Err(_) => ExitCode::FAILURE,
    }
}

/// Prints delivered outcomes until the scheduler goes away.
fn spawn_printer(
    config: Config,
    outcomes: Receiver<SearchOutcome>,
    options: ResultOptions,
) -> JoinHandle<ExitCode> {
    thread::spawn(move || {
        let mut code = ExitCode::SUCCESS;
        for outcome in outcomes {
            println!("{}", header(&format!("> {}", outcome.query.search_string())));
            match outcome.result {
                Ok(result) => {
                    let printed = output_results(&config, &outcome.query, result.as_ref(), options);
                    if printed != ExitCode::SUCCESS {
                        code = printed;
                    }
                }
                Err(e) => {
                    eprintln!("error: search failed: {e}");
                    code = ExitCode::FAILURE;
                }
            }
        }
        code
    })
}

/// Searches every line in order, without debouncing.
fn run_sequential(
    ctx: &CommandContext,
    cmd: &InteractiveCommand,
    searcher: &Searcher,
    options: ResultOptions,
) -> ExitCode {
    let mut code = ExitCode::SUCCESS;
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("error: failed to read input: {e}");
                return ExitCode::FAILURE;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let mut query = build_query(ctx, line, &cmd.scope);
        println!("{}", header(&format!("> {}", query.search_string())));
        match searcher.search(&mut query) {
            Ok(result) => {
                let printed = output_results(&ctx.config, &query, result.as_ref(), options);
                if printed != ExitCode::SUCCESS {
                    code = printed;
                }
            }
            Err(e) => {
                eprintln!("error: search failed: {e}");
                code = ExitCode::FAILURE;
            }
        }
    }
    code
}
