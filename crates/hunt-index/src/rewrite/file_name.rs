//! Co-searches file names when the whole query is one contents term.

use crate::{
    clause::{Clause, TermClause},
    field::Field,
    visit::Visitor,
};

/// Rewrites a lone contents term into `name:term^(2*boost) OR contents:term`.
///
/// Only fires when the term is the entire query, never for a term inside a larger query.
#[derive(Debug, Default)]
pub struct FileNameSearcher {
    /// Whether the root is a single contents term.
    root_is_term: bool,
}

impl Visitor for FileNameSearcher {
    fn init(&mut self, root: &Clause) {
        self.root_is_term = matches!(root, Clause::Term(t) if t.field.is(Field::Contents));
    }

    fn visit_term(&mut self, term: TermClause) -> Clause {
        if !self.root_is_term || !term.field.is(Field::Contents) {
            return Clause::Term(term);
        }
        let name = TermClause::new(Field::Name, term.text.clone()).with_boost(term.boost * 2.0);
        Clause::should([Clause::Term(name), Clause::Term(term)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clause::{BooleanClause, Occur},
        visit::rewrite,
    };

    #[test]
    fn single_contents_term_searches_names() {
        let out = rewrite(
            &mut FileNameSearcher::default(),
            Field::Contents.create_term("Reader"),
        );
        assert_eq!(out.to_string(), "name:Reader^2 contents:Reader");
    }

    #[test]
    fn terms_inside_larger_queries_are_untouched() {
        let root = Clause::Boolean(
            BooleanClause::new()
                .with(Occur::Must, Field::Contents.create_term("Reader"))
                .with(Occur::Must, Field::Ext.create_term("java")),
        );
        let out = rewrite(&mut FileNameSearcher::default(), root);
        assert_eq!(out.to_string(), "+contents:Reader +ext:java");
    }

    #[test]
    fn other_fields_are_untouched() {
        let out = rewrite(&mut FileNameSearcher::default(), Field::Ext.create_term("java"));
        assert_eq!(out.to_string(), "ext:java");
    }
}
