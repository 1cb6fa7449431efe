//! Rendering and JSON serialization for CLI output.

use std::{
    collections::BTreeSet,
    fs,
    ops::Range,
    path::{Path, PathBuf},
    process::ExitCode,
};

use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};
use hunt_config::Config;
use hunt_highlight::{Highlighter, file_path};
pub use hunt_highlight::{dim, header, success, warning};
use hunt_index::{
    IndexStats, ProgressReporter, SearchQuery, SearchResult, SearchResultDoc, StoredFile,
    extract_text_terms,
};
use serde::Serialize;
use tracing::{debug, warn};

/// Most matching lines shown per file.
const MAX_LINES_PER_FILE: usize = 10;

/// Reports indexing progress on stderr.
pub struct ConsoleReporter {
    /// Whether per-file progress is shown.
    verbose: bool,
}

impl ConsoleReporter {
    /// Shows unreadable files only.
    pub fn quiet() -> Self {
        Self { verbose: false }
    }

    /// Also shows each file as it is indexed or removed.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn on_file_start(&mut self, path: &Path, current: usize, total: usize) {
        if self.verbose {
            eprintln!("{}", dim(&format!("[{current}/{total}] {}", path.display())));
        }
    }

    fn on_file_done(&mut self, _path: &Path) {}

    fn on_file_error(&mut self, path: &Path, error: &str) {
        eprintln!(
            "{}",
            warning(&format!("warning: skipped {}: {error}", path.display()))
        );
    }

    fn on_file_removed(&mut self, file_path: &str) {
        if self.verbose {
            eprintln!("{}", dim(&format!("removed {file_path}")));
        }
    }

    fn on_complete(&mut self, _stats: &IndexStats) {}
}

/// Prints the summary of an indexing run.
pub fn print_index_stats(stats: &IndexStats) {
    let kind = if stats.full_rebuild {
        "Rebuilt index"
    } else {
        "Updated index"
    };
    println!(
        "{}: {} added, {} updated, {} removed",
        success(kind),
        stats.files_added,
        stats.files_updated,
        stats.files_removed
    );
    if stats.files_skipped > 0 {
        println!(
            "{}",
            warning(&format!("{} unreadable files skipped", stats.files_skipped))
        );
    }
    if stats.archives_skipped > 0 {
        println!(
            "{}",
            dim(&format!("{} archives not read", stats.archives_skipped))
        );
    }
}

/// What to show for each result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultOptions {
    /// Show per-file match counts.
    pub counts: bool,
    /// Show matching lines.
    pub lines: bool,
    /// Emit JSON instead of text.
    pub json: bool,
}

/// A source line containing query terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchLine {
    /// 1-based line number.
    pub number: usize,
    /// The line without its terminator.
    pub text: String,
    /// Byte spans of matched terms within `text`.
    #[serde(skip)]
    pub spans: Vec<Range<usize>>,
}

/// Finds the lines of `contents` that contain any of `terms`.
///
/// Lines are analyzed the way contents are indexed, so `map` matches inside `HashMap`.
pub fn matching_lines(
    contents: &str,
    terms: &BTreeSet<String>,
    min_word_length: usize,
) -> Vec<MatchLine> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let spans: Vec<Range<usize>> = extract_text_terms(line, min_word_length)
                .into_iter()
                .filter(|(term, _)| terms.contains(term))
                .flat_map(|(term, offsets)| {
                    offsets
                        .into_iter()
                        .map(move |offset| offset..offset + term.len())
                })
                .collect();
            (!spans.is_empty()).then(|| MatchLine {
                number: index + 1,
                text: line.to_string(),
                spans,
            })
        })
        .collect()
}

/// Locates the file behind a stored result on disk.
fn source_path(config: &Config, file: &StoredFile) -> Option<PathBuf> {
    if file.jar.is_some() {
        return None;
    }
    config
        .project(&file.project)
        .map(|p| p.path.join(file.rel_path()))
}

/// Reads the matching lines of a result file, empty when it cannot be read.
fn result_lines(config: &Config, file: &StoredFile, terms: &BTreeSet<String>) -> Vec<MatchLine> {
    let Some(path) = source_path(config, file) else {
        return Vec::new();
    };
    match fs::read_to_string(&path) {
        Ok(contents) => matching_lines(&contents, terms, config.index.min_word_length),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not read result file");
            Vec::new()
        }
    }
}

/// JSON output for one result file.
#[derive(Serialize)]
struct JsonResult<'a> {
    /// Stored fields.
    #[serde(flatten)]
    file: &'a StoredFile,
    /// Relevance score.
    score: f32,
    /// Query terms found in the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    matches: Option<u32>,
    /// Matching lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lines: Vec<MatchLine>,
}

/// JSON output for a search.
#[derive(Serialize)]
struct JsonSearchOutput<'a> {
    /// The query text.
    query: &'a str,
    /// Whether the literal attempt produced the results.
    exact: bool,
    /// Whether the fuzzy attempt produced the results.
    fuzzy: bool,
    /// Number of matching files, including those not shown.
    total_hits: usize,
    /// Whether more files matched than were shown.
    full: bool,
    /// Contents terms the query matched on.
    terms: Vec<&'a str>,
    /// Shown files.
    results: Vec<JsonResult<'a>>,
}

/// Renders search results to stdout.
pub fn output_results(
    config: &Config,
    query: &SearchQuery,
    result: Option<&SearchResult>,
    options: ResultOptions,
) -> ExitCode {
    let terms: BTreeSet<String> = result
        .map(|r| r.search_terms().keys().cloned().collect())
        .unwrap_or_default();

    if options.json {
        return output_json(config, query, result, &terms, options);
    }

    let Some(result) = result.filter(|r| !r.is_empty()) else {
        println!("{}", dim("No results found."));
        return ExitCode::SUCCESS;
    };

    if options.counts && !options.lines {
        print_counts_table(result);
    } else {
        let highlighter = options.lines.then(Highlighter::new);
        for doc in result.docs() {
            print_doc(config, doc, &terms, options, highlighter.as_ref());
        }
    }

    println!("{}", dim(&summary_line(query, result)));
    ExitCode::SUCCESS
}

/// One line describing which attempt matched and how many files there are.
fn summary_line(query: &SearchQuery, result: &SearchResult) -> String {
    let mode = if query.is_fuzzy() {
        "fuzzy"
    } else if query.is_exact() {
        "exact"
    } else {
        "split"
    };
    if result.is_full() && result.total_hits() > result.len() {
        format!(
            "{} of {} files ({mode})",
            result.len(),
            result.total_hits()
        )
    } else {
        format!("{} files ({mode})", result.len())
    }
}

/// Prints one result file, optionally with counts and matching lines.
fn print_doc(
    config: &Config,
    doc: &SearchResultDoc,
    terms: &BTreeSet<String>,
    options: ResultOptions,
    highlighter: Option<&Highlighter>,
) {
    let mut line = file_path(&doc.file.file);
    if options.counts {
        match doc.match_count() {
            Ok(count) => line.push_str(&dim(&format!(" ({count} matches)"))),
            Err(e) => warn!(file = %doc.file.file, error = %e, "match count failed"),
        }
    }
    println!("{line}");

    let Some(highlighter) = highlighter else {
        return;
    };
    let lines = result_lines(config, &doc.file, terms);
    for matched in lines.iter().take(MAX_LINES_PER_FILE) {
        println!(
            "  {} {}",
            dim(&format!("{:>5}:", matched.number)),
            highlighter.highlight_match_line(&matched.text, &doc.file.ext, &matched.spans)
        );
    }
    if lines.len() > MAX_LINES_PER_FILE {
        println!(
            "  {}",
            dim(&format!("... {} more lines", lines.len() - MAX_LINES_PER_FILE))
        );
    }
}

/// Prints results as a table of files, scores and match counts.
fn print_counts_table(result: &SearchResult) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["File", "Score", "Matches"]);
    for doc in result.docs() {
        let matches = doc
            .match_count()
            .map_or_else(|_| "-".to_string(), |c| c.to_string());
        table.add_row(vec![
            Cell::new(&doc.file.file),
            Cell::new(format!("{:.2}", doc.score)).set_alignment(CellAlignment::Right),
            Cell::new(matches).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
}

/// Serializes results as JSON.
fn output_json(
    config: &Config,
    query: &SearchQuery,
    result: Option<&SearchResult>,
    terms: &BTreeSet<String>,
    options: ResultOptions,
) -> ExitCode {
    let results = result.map_or_else(Vec::new, |result| {
        result
            .docs()
            .iter()
            .map(|doc| JsonResult {
                file: &doc.file,
                score: doc.score,
                matches: if options.counts {
                    doc.match_count().ok()
                } else {
                    None
                },
                lines: if options.lines {
                    result_lines(config, &doc.file, terms)
                } else {
                    Vec::new()
                },
            })
            .collect()
    });
    let output = JsonSearchOutput {
        query: query.search_string(),
        exact: query.is_exact(),
        fuzzy: query.is_fuzzy(),
        total_hits: result.map_or(0, SearchResult::total_hits),
        full: result.is_some_and(SearchResult::is_full),
        terms: terms.iter().map(String::as_str).collect(),
        results,
    };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints values one per line, or a note when there are none.
pub fn print_list(values: &[String], empty: &str) {
    if values.is_empty() {
        println!("{}", dim(empty));
        return;
    }
    for value in values {
        println!("{value}");
    }
}
