//! Search requests.

use std::{
    collections::BTreeSet,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{field::Field, rewrite::Filter};

/// Cooperative cancellation flag shared between a query and whoever may supersede it.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag that is not set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clears the flag.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for CancelFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CancelFlag").field(&self.is_canceled()).finish()
    }
}

/// One search request.
///
/// The exact and fuzzy flags change while the search falls back from one attempt to the
/// next; after the search they describe the attempt that produced the result.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Query text as typed.
    search_string: String,
    /// Most documents to return, `None` for all.
    max_results: Option<usize>,
    /// Search the literal text.
    exact: bool,
    /// Broaden contents terms.
    fuzzy: bool,
    /// Cancellation flag.
    canceled: CancelFlag,
    /// Project substituted for `.`.
    current_project: Option<String>,
    /// Scope restriction.
    filter: Option<Filter>,
}

impl SearchQuery {
    /// Creates an exact, non-fuzzy query.
    pub fn new(search_string: impl Into<String>, max_results: Option<usize>) -> Self {
        Self {
            search_string: search_string.into(),
            max_results,
            exact: true,
            fuzzy: false,
            canceled: CancelFlag::new(),
            current_project: None,
            filter: None,
        }
    }

    /// Query text.
    pub fn search_string(&self) -> &str {
        &self.search_string
    }

    /// Replaces the query text.
    pub fn set_search_string(&mut self, search_string: impl Into<String>) {
        self.search_string = search_string.into();
    }

    /// Most documents to return.
    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    /// Returns true if the number of results is bounded.
    pub fn is_limited(&self) -> bool {
        self.max_results.is_some()
    }

    /// Sets the bound on results.
    pub fn set_max_results(&mut self, max_results: Option<usize>) {
        self.max_results = max_results;
    }

    /// Whether the literal text is searched.
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Sets the exact flag.
    pub fn set_exact(&mut self, exact: bool) {
        self.exact = exact;
    }

    /// Whether contents terms are broadened.
    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy
    }

    /// Sets the fuzzy flag.
    pub fn set_fuzzy(&mut self, fuzzy: bool) {
        self.fuzzy = fuzzy;
    }

    /// Handle that cancels this query.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.canceled.clone()
    }

    /// Gives this query a flag of its own, detached from any clones, and returns it.
    pub fn renew_cancel_flag(&mut self) -> CancelFlag {
        self.canceled = CancelFlag::new();
        self.canceled.clone()
    }

    /// Cancels this query.
    pub fn cancel(&self) {
        self.canceled.cancel();
    }

    /// Returns true once cancellation was requested.
    pub fn is_canceled(&self) -> bool {
        self.canceled.is_canceled()
    }

    /// Project substituted for `.`.
    pub fn current_project(&self) -> Option<&str> {
        self.current_project.as_deref()
    }

    /// Sets the current project.
    pub fn set_current_project(&mut self, project: Option<String>) {
        self.current_project = project;
    }

    /// Scope restriction.
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Sets the scope restriction.
    pub fn set_filter(&mut self, filter: Option<Filter>) {
        self.filter = filter;
    }

    /// Adds `values` to the scope restriction of `field`.
    pub fn restrict(&mut self, field: Field, values: impl IntoIterator<Item = String>) {
        let values: BTreeSet<String> = values.into_iter().collect();
        if values.is_empty() {
            return;
        }
        self.filter
            .get_or_insert_with(Filter::new)
            .entry(field)
            .or_default()
            .extend(values);
    }
}

/// Two queries are equal when they would produce the same search; cancellation and the
/// current project are not compared.
impl PartialEq for SearchQuery {
    fn eq(&self, other: &Self) -> bool {
        self.search_string == other.search_string
            && self.max_results == other.max_results
            && self.exact == other.exact
            && self.fuzzy == other.fuzzy
            && self.filter == other.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let query = SearchQuery::new("reader", Some(10));
        assert!(query.is_exact());
        assert!(!query.is_fuzzy());
        assert!(query.is_limited());
        assert!(!query.is_canceled());
        assert!(query.filter().is_none());
    }

    #[test]
    fn cancel_flag_is_shared() {
        let query = SearchQuery::new("reader", None);
        let flag = query.cancel_flag();
        let copy = query.clone();
        flag.cancel();
        assert!(query.is_canceled());
        assert!(copy.is_canceled());
        flag.reset();
        assert!(!query.is_canceled());
    }

    #[test]
    fn restrict_merges_values() {
        let mut query = SearchQuery::new("reader", None);
        query.restrict(Field::Proj, ["a".to_string()]);
        query.restrict(Field::Proj, ["b".to_string()]);
        query.restrict(Field::Ext, Vec::new());
        let filter = query.filter().unwrap();
        assert_eq!(filter.len(), 1);
        assert_eq!(filter[&Field::Proj].len(), 2);
    }

    #[test]
    fn equality_ignores_cancellation() {
        let a = SearchQuery::new("x", None);
        let b = SearchQuery::new("x", None);
        b.cancel();
        assert_eq!(a, b);
        let mut c = SearchQuery::new("x", None);
        c.set_fuzzy(true);
        assert_ne!(a, c);
    }
}
