//! Search result types.
//!
//! A [`SearchResult`] holds the ranked [`SearchResultDoc`]s of one search together with the
//! contents terms the final query could match. Match counts and term scores need postings
//! lookups, so each document computes them on first request and caches them.

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, OnceLock},
};

use serde::Serialize;
use tantivy::{
    DocAddress, DocSet, Searcher as TvSearcher, TantivyDocument, Term,
    postings::Postings,
    schema::{Field as TvField, IndexRecordOption, Value},
};

use crate::{IndexError, field::NO_VALUE, schema::IndexSchema};

/// Stored fields of a matched file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    /// `/<project>/<relative path>`.
    pub file: String,
    /// Last path segment.
    pub name: String,
    /// Lowercase extension.
    pub ext: String,
    /// Project name.
    pub project: String,
    /// Archive name, if the file came from one.
    pub jar: Option<String>,
    /// Modification time in milliseconds.
    pub modified: i64,
}

impl StoredFile {
    /// Reads the stored fields of `doc`.
    pub(crate) fn from_doc(schema: &IndexSchema, doc: &TantivyDocument) -> Self {
        let text = |field: TvField| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let jar = text(schema.jar);
        Self {
            file: text(schema.file),
            name: text(schema.name),
            ext: text(schema.ext),
            project: text(schema.proj),
            jar: (!jar.is_empty() && jar != NO_VALUE).then_some(jar),
            modified: doc
                .get_first(schema.modified)
                .and_then(|v| v.as_i64())
                .unwrap_or_default(),
        }
    }

    /// Path relative to the project root.
    pub fn rel_path(&self) -> &str {
        self.file
            .strip_prefix('/')
            .and_then(|rest| rest.split_once('/'))
            .map_or(self.file.as_str(), |(_, rel)| rel)
    }
}

/// Snapshot and terms shared by the documents of one result.
struct ResultContext {
    /// Snapshot the hits came from.
    searcher: TvSearcher,
    /// Contents field.
    contents: TvField,
    /// Contents terms of the query.
    terms: Vec<String>,
}

/// One matched file.
pub struct SearchResultDoc {
    /// Engine address of the document.
    pub address: DocAddress,
    /// Relevance score.
    pub score: f32,
    /// Stored fields.
    pub file: StoredFile,
    /// Shared snapshot and terms.
    context: Arc<ResultContext>,
    /// Occurrences of each query term in the contents, computed on demand.
    frequencies: OnceLock<BTreeMap<String, u32>>,
}

impl SearchResultDoc {
    /// Occurrences of each query term in this file's contents.
    ///
    /// Computed on first call.
    pub fn term_frequencies(&self) -> Result<&BTreeMap<String, u32>, IndexError> {
        if let Some(frequencies) = self.frequencies.get() {
            return Ok(frequencies);
        }
        let computed = self.compute_frequencies()?;
        Ok(self.frequencies.get_or_init(|| computed))
    }

    /// Total occurrences of the query terms in this file's contents.
    pub fn match_count(&self) -> Result<u32, IndexError> {
        Ok(self.term_frequencies()?.values().sum())
    }

    /// Returns the match count if it was already computed.
    pub fn cached_match_count(&self) -> Option<u32> {
        self.frequencies.get().map(|f| f.values().sum())
    }

    /// tf-idf score of each query term present in this file.
    ///
    /// `tf` is the square root of the term's frequency in the file and `idf` is
    /// `1 + ln(num_docs / (doc_freq + 1))`.
    pub fn term_scores(&self) -> Result<BTreeMap<String, f32>, IndexError> {
        let searcher = &self.context.searcher;
        let num_docs = searcher.num_docs() as f32;
        let mut scores = BTreeMap::new();
        for (text, &freq) in self.term_frequencies()? {
            if freq == 0 {
                continue;
            }
            let term = Term::from_field_text(self.context.contents, text);
            let doc_freq = searcher.doc_freq(&term).map_err(|e| IndexError::read(&e))? as f32;
            let idf = 1.0 + (num_docs / (doc_freq + 1.0)).ln();
            scores.insert(text.clone(), (freq as f32).sqrt() * idf);
        }
        Ok(scores)
    }

    /// Looks up each query term's frequency in this document's postings.
    fn compute_frequencies(&self) -> Result<BTreeMap<String, u32>, IndexError> {
        let context = &self.context;
        let segment = context.searcher.segment_reader(self.address.segment_ord);
        let inverted_index = segment
            .inverted_index(context.contents)
            .map_err(|e| IndexError::read(&e))?;
        let mut frequencies = BTreeMap::new();
        for text in &context.terms {
            let term = Term::from_field_text(context.contents, text);
            let postings = inverted_index
                .read_postings(&term, IndexRecordOption::WithFreqs)
                .map_err(IndexError::Io)?;
            let Some(mut postings) = postings else {
                continue;
            };
            let target = self.address.doc_id;
            let mut doc = postings.doc();
            if doc < target {
                doc = postings.seek(target);
            }
            if doc == target {
                frequencies.insert(text.clone(), postings.term_freq());
            }
        }
        Ok(frequencies)
    }
}

impl fmt::Debug for SearchResultDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchResultDoc")
            .field("file", &self.file.file)
            .field("score", &self.score)
            .field("match_count", &self.cached_match_count())
            .finish()
    }
}

/// The outcome of one search.
#[derive(Debug)]
pub struct SearchResult {
    /// Ranked documents.
    docs: Vec<SearchResultDoc>,
    /// Contents terms of the final query with their weights.
    terms: BTreeMap<String, f32>,
    /// Requested maximum, `None` for unlimited.
    max_results: Option<usize>,
    /// Whether the attempt that produced this result was exact.
    exact: bool,
    /// Whether the attempt that produced this result was fuzzy.
    fuzzy: bool,
    /// Total number of matching documents.
    total_hits: usize,
}

impl SearchResult {
    /// Ranked documents.
    pub fn docs(&self) -> &[SearchResultDoc] {
        &self.docs
    }

    /// Contents terms the query could match, with their weights.
    pub fn search_terms(&self) -> &BTreeMap<String, f32> {
        &self.terms
    }

    /// Returns true if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Number of documents returned.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Returns true if the result holds exactly the requested maximum.
    pub fn is_full(&self) -> bool {
        self.max_results == Some(self.docs.len())
    }

    /// Total number of matching documents, including those past the limit.
    pub fn total_hits(&self) -> usize {
        self.total_hits
    }

    /// Whether the exact attempt produced this result.
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Whether the fuzzy attempt produced this result.
    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy
    }
}

/// Collects hits into a [`SearchResult`].
pub(crate) struct ResultBuilder {
    /// Shared document context.
    context: Arc<ResultContext>,
    /// Term weights.
    terms: BTreeMap<String, f32>,
    /// Schema for stored fields.
    schema: IndexSchema,
    /// Documents so far.
    docs: Vec<SearchResultDoc>,
}

impl ResultBuilder {
    /// Starts a result for hits from `searcher`.
    pub(crate) fn new(
        searcher: TvSearcher,
        schema: IndexSchema,
        terms: BTreeMap<String, f32>,
    ) -> Self {
        let context = Arc::new(ResultContext {
            searcher,
            contents: schema.contents,
            terms: terms.keys().cloned().collect(),
        });
        Self {
            context,
            terms,
            schema,
            docs: Vec::new(),
        }
    }

    /// Adds one hit, loading its stored fields.
    pub(crate) fn push(&mut self, address: DocAddress, score: f32) -> Result<(), IndexError> {
        let doc: TantivyDocument = self
            .context
            .searcher
            .doc(address)
            .map_err(|e| IndexError::read(&e))?;
        self.docs.push(SearchResultDoc {
            address,
            score,
            file: StoredFile::from_doc(&self.schema, &doc),
            context: Arc::clone(&self.context),
            frequencies: OnceLock::new(),
        });
        Ok(())
    }

    /// Documents added so far.
    pub(crate) fn docs(&self) -> &[SearchResultDoc] {
        &self.docs
    }

    /// Finishes the result.
    pub(crate) fn finish(
        self,
        max_results: Option<usize>,
        exact: bool,
        fuzzy: bool,
        total_hits: usize,
    ) -> SearchResult {
        SearchResult {
            docs: self.docs,
            terms: self.terms,
            max_results,
            exact,
            fuzzy,
            total_hits,
        }
    }
}
