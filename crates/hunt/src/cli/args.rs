//! Clap argument definitions for the `hunt` CLI.

use std::{env, process::exit};

use clap::{Args, CommandFactory, Parser, Subcommand, error::ErrorKind};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "hunt")]
#[command(about = "Code-aware full-text search over project source trees")]
pub struct Cli {
    /// Log debug output to stderr (HUNT_LOG overrides)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags narrowing which files a search looks at.
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Maximum files to show [default: search.limit]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Only search these projects (can be specified multiple times)
    #[arg(short = 'p', long = "project")]
    pub projects: Vec<String>,

    /// Only search files with these extensions (can be specified multiple times)
    #[arg(short = 'e', long = "ext")]
    pub extensions: Vec<String>,

    /// Project that `.` stands for [default: the project containing the working directory]
    #[arg(long)]
    pub current_project: Option<String>,
}

/// Arguments for `hunt search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Query words, joined with spaces
    #[arg(required = true)]
    pub queries: Vec<String>,

    #[command(flatten)]
    /// Scope restrictions.
    pub scope: ScopeArgs,

    /// Start with the literal query text (default)
    #[arg(long, overrides_with = "no_exact")]
    pub exact: bool,

    /// Skip the literal attempt and search split identifiers right away
    #[arg(long, overrides_with = "exact")]
    pub no_exact: bool,

    /// Broaden terms to prefix, substring and similar spellings
    #[arg(long)]
    pub fuzzy: bool,

    /// Show how many query terms each file contains
    #[arg(long)]
    pub counts: bool,

    /// Show the matching lines of each file
    #[arg(long)]
    pub lines: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show the rewritten query instead of searching
    #[arg(long)]
    pub explain: bool,
}

impl SearchCommand {
    /// The query text.
    pub fn query_text(&self) -> String {
        self.queries.join(" ")
    }
}

/// Arguments for `hunt terms`.
#[derive(Args, Debug, Clone)]
pub struct TermsCommand {
    /// Prefix to complete (case-insensitive)
    #[arg(default_value = "")]
    pub prefix: String,

    /// Field to list: contents, file, name, ext, proj, jar [default: contents]
    #[arg(short = 'f', long)]
    pub field: Option<String>,
}

/// Arguments for `hunt init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.hunt.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `hunt interactive`.
#[derive(Args, Debug, Clone)]
pub struct InteractiveCommand {
    #[command(flatten)]
    /// Scope restrictions.
    pub scope: ScopeArgs,

    /// Debounce delay in milliseconds [default: search.typing_delay_ms]
    #[arg(long)]
    pub delay: Option<u64>,

    /// Do not run the periodic index update while the session is open
    #[arg(long)]
    pub no_update: bool,
}

/// Supported `hunt` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize hunt configuration in current directory
    Init(InitCommand),

    /// Rebuild the search index from scratch
    Index,

    /// Index new and changed files, drop deleted ones
    Update,

    /// Search the index
    #[command(after_help = "\
QUERY SYNTAX:
  term              Term must appear
  term1 term2       Both terms (implicit AND)
  \"phrase\"          Exact phrase match
  -term             Term must NOT appear
  term1 OR term2    Either term
  (expr)            Grouping
  Hash*             Prefix, * and ? wildcards

FIELD QUERIES:
  file:path         Path of the file, /<project>/<path>
  name:App.java     File name
  ext:java          File extension (ext:. for files without one)
  proj:core         Project (proj:. for the current project)
  ws:backend        Projects of a working set
  dir:src/main      Files below a directory
  modified:today    Modified within today, yesterday, hour, day, week, month, 3 days

EXAMPLES:
  hunt search HashMap
  hunt search 'new HashMap' --lines
  hunt search 'reader -test ext:java'
  hunt search 'proj:core modified:week'
  hunt search 'ws:backend (parse OR lex)'")]
    Search(SearchCommand),

    /// Complete a prefix from the indexed terms
    Terms(TermsCommand),

    /// List the indexed projects
    Projects,

    /// List the names accepted by modified:
    Durations,

    /// Remove entries from the index
    Delete {
        /// What to delete
        #[command(subcommand)]
        what: DeleteWhat,
    },

    /// Show status and validate configuration
    Status,

    /// Show effective configuration settings
    Config,

    /// Search each line read from stdin as it is typed
    Interactive(InteractiveCommand),
}

/// What to delete with `hunt delete`.
#[derive(Clone, Subcommand, Debug)]
pub enum DeleteWhat {
    /// The whole index
    Index,
    /// One file
    File {
        /// Path on disk, or indexed path /<project>/<path>
        path: String,
    },
    /// Every file below a folder
    Folder {
        /// Path on disk, or indexed path /<project>/<path>
        path: String,
    },
    /// Every file of a project
    Project {
        /// Project name
        name: String,
    },
}

/// Parses CLI arguments, printing hierarchical help for top-level `--help`.
pub fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if e.kind() == ErrorKind::DisplayHelp {
                let args: Vec<_> = env::args().collect();
                if args.len() <= 2 {
                    print_hierarchical_help();
                    exit(0);
                }
            }
            e.exit();
        }
    }
}

/// Prints custom help with hierarchical subcommand display.
fn print_hierarchical_help() {
    let cmd = Cli::command();
    let about = cmd.get_about().map(|s| s.to_string()).unwrap_or_default();

    println!("{about}");
    println!();
    println!("Usage: hunt [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");

    for sub in cmd.get_subcommands() {
        let name = sub.get_name();
        if name == "help" {
            continue;
        }

        let about = sub.get_about().map(|s| s.to_string()).unwrap_or_default();
        println!("  {name:12} {about}");

        for subsub in sub.get_subcommands() {
            let subname = subsub.get_name();
            if subname == "help" {
                continue;
            }
            let subabout = subsub
                .get_about()
                .map(|s| s.to_string())
                .unwrap_or_default();
            println!("    {subname:10} {subabout}");
        }
    }

    println!(
        "  {:<12} Print this message or the help of the given subcommand(s)",
        "help"
    );
    println!();
    println!("Options:");
    println!("  -v, --verbose  Log debug output to stderr (HUNT_LOG overrides)");
    println!("  -h, --help     Print help");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parses a command line, panicking on errors.
    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_collects_scope() {
        let cli = parse(&[
            "hunt", "search", "new", "HashMap", "-n", "5", "-p", "core", "--project", "api",
            "--ext", "java",
        ]);
        let Commands::Search(cmd) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(cmd.query_text(), "new HashMap");
        assert_eq!(cmd.scope.limit, Some(5));
        assert_eq!(cmd.scope.projects, vec!["core", "api"]);
        assert_eq!(cmd.scope.extensions, vec!["java"]);
        assert!(!cmd.no_exact);
    }

    #[test]
    fn last_exact_flag_wins() {
        let Commands::Search(cmd) = parse(&["hunt", "search", "x", "--exact", "--no-exact"]).command
        else {
            panic!("expected search");
        };
        assert!(cmd.no_exact);
        assert!(!cmd.exact);

        let Commands::Search(cmd) = parse(&["hunt", "search", "x", "--no-exact", "--exact"]).command
        else {
            panic!("expected search");
        };
        assert!(cmd.exact);
        assert!(!cmd.no_exact);
    }

    #[test]
    fn verbose_is_global() {
        assert!(parse(&["hunt", "status", "-v"]).verbose);
        assert!(!parse(&["hunt", "status"]).verbose);
    }

    #[test]
    fn delete_subcommands() {
        let Commands::Delete { what } = parse(&["hunt", "delete", "folder", "src/main"]).command
        else {
            panic!("expected delete");
        };
        assert!(matches!(what, DeleteWhat::Folder { path } if path == "src/main"));
        assert!(Cli::try_parse_from(["hunt", "delete", "file"]).is_err());
    }

    #[test]
    fn search_requires_a_query() {
        assert!(Cli::try_parse_from(["hunt", "search"]).is_err());
    }

    #[test]
    fn terms_prefix_defaults_to_empty() {
        let Commands::Terms(cmd) = parse(&["hunt", "terms", "--field", "ext"]).command else {
            panic!("expected terms");
        };
        assert_eq!(cmd.prefix, "");
        assert_eq!(cmd.field.as_deref(), Some("ext"));
    }
}
