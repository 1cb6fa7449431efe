//! Expands comma separated values of non-contents fields.

use crate::{
    clause::{Clause, TermClause},
    field::Field,
    visit::Visitor,
};

/// Rewrites `ext:java,xml` into `ext:java OR ext:xml`.
///
/// Unresolved field names are kept so that `project:a,b` still resolves later.
#[derive(Debug, Default)]
pub struct CsvExpander;

impl Visitor for CsvExpander {
    fn visit_term(&mut self, term: TermClause) -> Clause {
        if term.field.is(Field::Contents) || !term.text.contains(',') {
            return Clause::Term(term);
        }
        Clause::should(
            term.text
                .split(',')
                .filter(|value| !value.is_empty())
                .map(|value| Clause::Term(TermClause::new(term.field.clone(), value))),
        )
    }
}
