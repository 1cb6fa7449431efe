//! Restricts a query to the active scope filter (projects, extensions, ...).
//!
//! A clause on a filtered field absorbs the filter values as alternatives. Filter fields
//! that no clause mentioned are ANDed onto the whole query at the end.

use std::{
    collections::{BTreeMap, BTreeSet},
    iter, mem,
};

use crate::{
    clause::{BooleanClause, Clause, Occur, TermClause},
    field::Field,
    visit::Visitor,
};

/// Allowed values per field.
pub type Filter = BTreeMap<Field, BTreeSet<String>>;

/// Injects filter values into the query.
#[derive(Debug)]
pub struct FilterInjector {
    /// Filter entries not yet consumed by a clause.
    remaining: Filter,
}

impl FilterInjector {
    /// Creates an injector for `filter`.
    pub fn new(filter: Filter) -> Self {
        Self { remaining: filter }
    }

    /// Combines `original` with the filter values of its field, consuming them.
    fn absorb(&mut self, original: Clause, field: Option<Field>) -> Clause {
        match field.and_then(|f| self.remaining.remove(&f).map(|values| (f, values))) {
            Some((field, values)) => {
                let boost = original.boost();
                Clause::should(iter::once(original).chain(values_of(field, values)))
                    .with_boost(boost)
            }
            None => original,
        }
    }
}

/// Term clauses for each value.
fn values_of(field: Field, values: BTreeSet<String>) -> impl Iterator<Item = Clause> {
    values.into_iter().map(move |v| field.create_term(v))
}

impl Visitor for FilterInjector {
    fn visit_term(&mut self, term: TermClause) -> Clause {
        let field = term.field.known();
        self.absorb(Clause::Term(term), field)
    }

    fn visit_prefix(&mut self, prefix: TermClause) -> Clause {
        let field = prefix.field.known();
        self.absorb(Clause::Prefix(prefix), field)
    }

    fn visit_wildcard(&mut self, wildcard: TermClause) -> Clause {
        let field = wildcard.field.known();
        self.absorb(Clause::Wildcard(wildcard), field)
    }

    fn end(&mut self, root: Clause) -> Clause {
        if self.remaining.is_empty() {
            return root;
        }
        let mut conjunction = BooleanClause::new().with(Occur::Must, root);
        for (field, values) in mem::take(&mut self.remaining) {
            if values.len() == 1 {
                for value in values_of(field, values) {
                    conjunction.add(Occur::Must, value);
                }
            } else {
                conjunction.add(Occur::Must, Clause::should(values_of(field, values)));
            }
        }
        Clause::Boolean(conjunction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visit::rewrite;

    fn filter(entries: &[(Field, &[&str])]) -> Filter {
        entries
            .iter()
            .map(|(field, values)| (*field, values.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn unconsumed_filters_are_anded() {
        let mut injector = FilterInjector::new(filter(&[
            (Field::Proj, &["P1"]),
            (Field::Ext, &["java", "xml"]),
        ]));
        let out = rewrite(&mut injector, Field::Contents.create_term("foo"));
        assert_eq!(
            out.to_string(),
            "+contents:foo +(ext:java ext:xml) +proj:P1"
        );
    }

    #[test]
    fn matching_clause_absorbs_values() {
        let mut injector = FilterInjector::new(filter(&[(Field::Proj, &["P1", "P2"])]));
        let root = Clause::Boolean(
            BooleanClause::new()
                .with(Occur::Must, Field::Contents.create_term("foo"))
                .with(Occur::Must, Field::Proj.create_term("P3").with_boost(2.0)),
        );
        let out = rewrite(&mut injector, root);
        assert_eq!(
            out.to_string(),
            "+contents:foo +(proj:P3^2 proj:P1 proj:P2)^2"
        );
    }

    #[test]
    fn empty_filter_is_identity() {
        let mut injector = FilterInjector::new(Filter::new());
        let out = rewrite(&mut injector, Field::Contents.create_term("foo"));
        assert_eq!(out.to_string(), "contents:foo");
    }
}
