//! Query building and compilation.
//!
//! A query string travels through three steps before it reaches the index:
//!
//! 1. [`hunt_query::parse`] turns the text into a syntax tree.
//! 2. [`ClauseBuilder`] turns the syntax tree into a [`Clause`](crate::clause::Clause) tree,
//!    analysing values according to an [`AnalysisMode`](crate::analyzer::AnalysisMode).
//! 3. After rewriting, [`QueryCompiler`] turns the clause tree into a Tantivy query.

mod build;
mod compile;

pub use build::{ClauseBuilder, DEFAULT_PHRASE_SLOP, convert_to_phrase};
pub(crate) use compile::dictionary_prefix;
pub use compile::{CompiledQuery, MAX_CLAUSE_COUNT, QueryCompiler, fuzzy_distance, glob_to_regex};
pub use hunt_query::{QueryError, QueryErrorKind, QueryExpr, parse};
