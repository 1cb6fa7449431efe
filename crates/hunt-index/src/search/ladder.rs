//! The exact, split and fuzzy attempts of a search.

use chrono::Local;
use hunt_query::{QueryError, QueryExpr, parse};
use tantivy::Searcher as TvSearcher;
use tracing::{debug, warn};

use super::{SearchQuery, Searcher};
use crate::{
    IndexError,
    analyzer::AnalysisMode,
    clause::Clause,
    query::{ClauseBuilder, CompiledQuery, QueryCompiler, convert_to_phrase},
    result::SearchResult,
    rewrite::{RewriteOptions, expand_exact, rewrite_query},
    schema::IndexSchema,
};

/// Shortest query text that is searched at all.
pub const MIN_QUERY_LENGTH: usize = 2;

/// Characters blanked out when a query does not parse.
const SYNTAX_CHARS: [char; 8] = ['(', ')', '"', '[', ']', '\'', '{', '}'];

/// Why one attempt could not produce a query.
enum AttemptError {
    /// The text does not parse.
    Syntax(QueryError),
    /// Compiling against the index failed.
    Index(IndexError),
}

impl From<IndexError> for AttemptError {
    fn from(err: IndexError) -> Self {
        Self::Index(err)
    }
}

/// Returns true for a missing or empty result.
fn is_empty(result: &Option<SearchResult>) -> bool {
    result.as_ref().is_none_or(SearchResult::is_empty)
}

/// Replaces query syntax characters with spaces.
fn strip_syntax(text: &str) -> String {
    text.chars()
        .map(|c| if SYNTAX_CHARS.contains(&c) { ' ' } else { c })
        .collect()
}

#[allow(clippy::multiple_inherent_impl)]
impl Searcher {
    /// Searches the index, falling back from exact to split to fuzzy matching.
    ///
    /// The exact and fuzzy flags of `query` are left describing the attempt that produced
    /// the result. Returns `None` for text shorter than [`MIN_QUERY_LENGTH`], for a
    /// canceled query, and when no attempt matched anything.
    pub fn search(&self, query: &mut SearchQuery) -> Result<Option<SearchResult>, IndexError> {
        if query.search_string().chars().count() < MIN_QUERY_LENGTH {
            return Ok(None);
        }

        let mut result = None;
        if query.is_fuzzy() {
            query.set_exact(false);
            result = self.search_index(query)?;
        } else {
            if query.is_exact() {
                result = self.search_index(query)?;
            }
            if is_empty(&result) && !query.is_canceled() {
                query.set_exact(false);
                result = self.search_index(query)?;
                if is_empty(&result) && self.settings.fuzzy_auto && !query.is_canceled() {
                    query.set_fuzzy(true);
                    result = self.search_index(query)?;
                }
            }
        }

        if query.is_canceled() {
            debug!(query = query.search_string(), "search canceled");
            return Ok(None);
        }
        Ok(result)
    }

    /// Returns the rewritten clause tree the current attempt of `query` would run.
    pub fn explain(&self, query: &SearchQuery) -> Result<Option<String>, QueryError> {
        Ok(self.build_clause(query, true)?.map(|c| c.to_string()))
    }

    /// Runs one attempt with the current flags of `query`.
    fn search_index(&self, query: &mut SearchQuery) -> Result<Option<SearchResult>, IndexError> {
        if query.is_canceled() {
            return Ok(None);
        }
        let (searcher, schema) = self.reader.searcher()?;
        debug!(
            query = query.search_string(),
            exact = query.is_exact(),
            fuzzy = query.is_fuzzy(),
            "search attempt"
        );
        let Some(compiled) = self.compile_attempt(query, &searcher, &schema)? else {
            return Ok(None);
        };
        self.collect(query, searcher, schema, compiled)
    }

    /// Compiles the attempt, blanking syntax characters once if the text does not parse.
    fn compile_attempt(
        &self,
        query: &mut SearchQuery,
        searcher: &TvSearcher,
        schema: &IndexSchema,
    ) -> Result<Option<CompiledQuery>, IndexError> {
        let err = match self.compile_with_prefix(query, searcher, schema) {
            Ok(compiled) => return Ok(compiled),
            Err(AttemptError::Index(err)) => return Err(err),
            Err(AttemptError::Syntax(err)) => err,
        };
        let cleaned = strip_syntax(query.search_string());
        debug!(error = %err.message(), query = cleaned, "retrying without syntax characters");
        query.set_search_string(cleaned);
        match self.compile_with_prefix(query, searcher, schema) {
            Ok(compiled) => Ok(compiled),
            Err(AttemptError::Index(err)) => Err(err),
            Err(AttemptError::Syntax(err)) => {
                warn!(error = %err.message(), query = query.search_string(), "query does not parse");
                Ok(None)
            }
        }
    }

    /// Compiles with prefix completion, dropping it if it expands past the clause ceiling.
    ///
    /// An attempt that is still too broad without prefix completion matches nothing.
    fn compile_with_prefix(
        &self,
        query: &SearchQuery,
        searcher: &TvSearcher,
        schema: &IndexSchema,
    ) -> Result<Option<CompiledQuery>, AttemptError> {
        match self.compile_query(query, searcher, schema, true) {
            Err(AttemptError::Index(IndexError::TooManyClauses { limit })) => {
                debug!(limit, "prefix completion expands too far, retrying without");
            }
            other => return other,
        }
        match self.compile_query(query, searcher, schema, false) {
            Err(AttemptError::Index(IndexError::TooManyClauses { limit })) => {
                warn!(limit, query = query.search_string(), "query expands too far");
                Ok(None)
            }
            other => other,
        }
    }

    /// Builds, rewrites and compiles the query of the current attempt.
    fn compile_query(
        &self,
        query: &SearchQuery,
        searcher: &TvSearcher,
        schema: &IndexSchema,
        prefix: bool,
    ) -> Result<Option<CompiledQuery>, AttemptError> {
        let Some(clause) = self
            .build_clause(query, prefix)
            .map_err(AttemptError::Syntax)?
        else {
            return Ok(None);
        };
        let compiled = QueryCompiler::new(schema, searcher).compile(&clause)?;
        Ok(Some(compiled))
    }

    /// Builds the rewritten clause tree of the current attempt.
    ///
    /// An exact attempt searches the exact sub-query alone. Otherwise the exact sub-query,
    /// boosted to twice the split query's boost, is OR-ed with the split query.
    fn build_clause(&self, query: &SearchQuery, prefix: bool) -> Result<Option<Clause>, QueryError> {
        let text = query.search_string();
        let Some(expr) = parse(text)? else {
            return Ok(None);
        };

        let exact = self.exact_clause(text, &expr);
        let combined = if query.is_exact() {
            exact
        } else {
            let tokenized =
                ClauseBuilder::new(AnalysisMode::Tokenized, self.min_word_length).build(&expr);
            match (exact, tokenized) {
                (Some(exact), Some(tokenized)) => {
                    let boost = tokenized.boost() * 2.0;
                    Some(Clause::should([exact.with_boost(boost), tokenized]))
                }
                (exact, tokenized) => exact.or(tokenized),
            }
        };
        let Some(clause) = combined else {
            return Ok(None);
        };

        let options = RewriteOptions {
            fuzzy: query.is_fuzzy(),
            prefix,
            prefix_min_length: self.settings.prefix_min_length,
            filter: query.filter(),
            working_sets: self.working_sets.as_ref(),
            current_project: query.current_project(),
            now: Local::now(),
        };
        Ok(Some(rewrite_query(clause, &options)))
    }

    /// Builds the exact sub-query: multi-word text becomes a phrase, a single word stays
    /// one unanalyzed term.
    fn exact_clause(&self, text: &str, expr: &QueryExpr) -> Option<Clause> {
        let clause = if text.contains(' ') {
            ClauseBuilder::new(AnalysisMode::Standard, self.min_word_length)
                .build(expr)
                .map(convert_to_phrase)?
        } else {
            ClauseBuilder::new(AnalysisMode::Keyword, self.min_word_length).build(expr)?
        };
        Some(expand_exact(clause))
    }
}
