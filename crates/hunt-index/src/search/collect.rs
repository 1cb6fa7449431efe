//! Hit collection.

use tantivy::{
    Searcher as TvSearcher,
    collector::{Count, TopDocs},
};
use tracing::{debug, warn};

use super::{SearchQuery, Searcher};
use crate::{
    IndexError,
    query::CompiledQuery,
    result::{ResultBuilder, SearchResult},
    schema::IndexSchema,
};

#[allow(clippy::multiple_inherent_impl)]
impl Searcher {
    /// Executes `compiled` and materializes up to the requested number of hits.
    ///
    /// Cancellation is checked before execution and between hits. Match counts are
    /// computed eagerly when `show_match_counts` is set; a document whose count cannot be
    /// computed is kept without one.
    pub(super) fn collect(
        &self,
        query: &SearchQuery,
        searcher: TvSearcher,
        schema: IndexSchema,
        compiled: CompiledQuery,
    ) -> Result<Option<SearchResult>, IndexError> {
        if query.is_canceled() {
            return Ok(None);
        }
        let num_docs = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
        let limit = query.max_results().unwrap_or(num_docs).max(1);

        let (hits, total_hits) = searcher
            .search(&compiled.query, &(TopDocs::with_limit(limit), Count))
            .map_err(|e| IndexError::read(&e))?;
        debug!(total_hits, returned = hits.len(), "collected hits");
        if total_hits == 0 {
            return Ok(None);
        }

        let mut builder = ResultBuilder::new(searcher, schema, compiled.terms);
        for (score, address) in hits {
            if query.is_canceled() {
                return Ok(None);
            }
            builder.push(address, score)?;
            if self.settings.show_match_counts
                && let Some(doc) = builder.docs().last()
                && let Err(err) = doc.match_count()
            {
                warn!(file = doc.file.file, error = %err, "cannot count matches");
            }
        }

        Ok(Some(builder.finish(
            query.max_results(),
            query.is_exact(),
            query.is_fuzzy(),
            total_hits,
        )))
    }
}
