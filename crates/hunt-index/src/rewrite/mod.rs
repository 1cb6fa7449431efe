//! Query rewriting pipeline.
//!
//! A parsed clause tree passes through a fixed sequence of stages, each one a [`Visitor`]
//! built fresh for the call:
//!
//! | # | Stage | Effect |
//! |---|---|---|
//! | 1 | [`CaseExpander`] | `name:ABC` also matches `A*B*C*` |
//! | 2 | [`FileNameSearcher`] | a lone contents term also searches file names |
//! | 3 | [`Lowercaser`] | contents clauses are lowercased |
//! | 4 | [`Fuzzifier`] | fuzzy attempt only: contents terms become prefix/substring/fuzzy |
//! | 5 | [`CsvExpander`] | `ext:java,xml` becomes an OR |
//! | 6 | [`AliasResolver`] | `project:` becomes `proj:` and so on |
//! | 7 | [`ModifiedTimeConverter`] | `modified:week` becomes a time range |
//! | 8 | [`DirectoryRewriter`] | `dir:src` becomes a file path match |
//! | 9 | [`LastTermPrefixer`] | the last term also matches as a prefix |
//! | 10 | [`FilterInjector`] | the scope filter is applied |
//! | 11 | [`WorkingSetExpander`] | `ws:name` becomes its projects |
//! | 12 | [`CurrentProjectSetter`] | `proj:.` becomes the current project |
//!
//! Stages 1 and 2 shape the exact sub-query ([`expand_exact`]); stage 1 runs again, followed
//! by stages 3 to 12, over the whole query ([`rewrite_query`]).

mod alias;
mod case_expander;
mod csv;
mod current_project;
mod directory;
mod file_name;
mod filter;
mod fuzzify;
mod lowercase;
mod modified;
mod prefix;
mod working_set;

pub use alias::AliasResolver;
pub use case_expander::CaseExpander;
use chrono::{DateTime, Local};
pub use csv::CsvExpander;
pub use current_project::{CURRENT_PROJECT, CurrentProjectSetter};
pub use directory::DirectoryRewriter;
pub use file_name::FileNameSearcher;
pub use filter::{Filter, FilterInjector};
pub use fuzzify::Fuzzifier;
pub use lowercase::Lowercaser;
pub use modified::{DURATION_NAMES, ModifiedTimeConverter, duration_range};
pub use prefix::LastTermPrefixer;
use tracing::debug;
pub use working_set::{WorkingSetExpander, WorkingSets};

use crate::{
    clause::Clause,
    visit::{Visitor, rewrite},
};

/// Per-attempt settings for [`rewrite_query`].
pub struct RewriteOptions<'a> {
    /// Broaden contents terms.
    pub fuzzy: bool,
    /// Add prefix completion to the last term. Ignored when `fuzzy` is set.
    pub prefix: bool,
    /// Shortest term that receives prefix completion.
    pub prefix_min_length: usize,
    /// Scope restriction, if any.
    pub filter: Option<&'a Filter>,
    /// Working set membership.
    pub working_sets: &'a dyn WorkingSets,
    /// Project substituted for `.`.
    pub current_project: Option<&'a str>,
    /// Reference instant for relative durations.
    pub now: DateTime<Local>,
}

/// Runs one stage and logs the result.
fn stage<V: Visitor>(name: &str, mut visitor: V, clause: Clause) -> Clause {
    let out = rewrite(&mut visitor, clause);
    debug!(stage = name, query = %out, "rewrite");
    out
}

/// Applies the stages that shape the exact sub-query.
pub fn expand_exact(clause: Clause) -> Clause {
    let clause = stage("case", CaseExpander, clause);
    stage("file-name", FileNameSearcher::default(), clause)
}

/// Applies the rewrite pipeline to a full query.
pub fn rewrite_query(clause: Clause, options: &RewriteOptions<'_>) -> Clause {
    let mut clause = stage("case", CaseExpander, clause);
    clause = stage("lowercase", Lowercaser, clause);
    if options.fuzzy {
        clause = stage("fuzzy", Fuzzifier, clause);
    }
    clause = stage("csv", CsvExpander, clause);
    clause = stage("alias", AliasResolver, clause);
    clause = stage("modified", ModifiedTimeConverter::new(options.now), clause);
    clause = stage("directory", DirectoryRewriter, clause);
    if options.prefix && !options.fuzzy {
        clause = stage(
            "prefix",
            LastTermPrefixer::new(options.prefix_min_length),
            clause,
        );
    }
    if let Some(filter) = options.filter {
        clause = stage("filter", FilterInjector::new(filter.clone()), clause);
    }
    clause = stage(
        "working-set",
        WorkingSetExpander::new(options.working_sets),
        clause,
    );
    if let Some(project) = options.current_project {
        clause = stage("current-project", CurrentProjectSetter::new(project), clause);
    }
    clause
}
