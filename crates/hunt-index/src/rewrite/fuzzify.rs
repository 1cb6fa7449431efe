//! Broadens contents terms for the fuzzy attempt of the search ladder.

use crate::{
    clause::{Clause, Occur, PhraseClause, TermClause},
    field::Field,
    visit::Visitor,
};

/// Turns every contents term into `term* OR *term*^0.75 OR term~^0.5`.
///
/// Negated branches are left alone. Contents phrases become a group of fuzzy terms.
#[derive(Debug, Default)]
pub struct Fuzzifier;

impl Visitor for Fuzzifier {
    fn visit_term(&mut self, term: TermClause) -> Clause {
        if !term.field.is(Field::Contents) {
            return Clause::Term(term);
        }
        let boost = term.boost;
        let wildcard = TermClause::new(Field::Contents, format!("*{}*", term.text));
        let fuzzy = TermClause::new(Field::Contents, term.text.clone());
        Clause::should([
            Clause::Prefix(term),
            Clause::Wildcard(wildcard.with_boost(boost * 0.75)),
            Clause::Fuzzy(fuzzy.with_boost(boost * 0.5)),
        ])
    }

    fn visit_phrase(&mut self, phrase: PhraseClause) -> Clause {
        if !phrase.field.is(Field::Contents) {
            return Clause::Phrase(phrase);
        }
        Clause::should(
            phrase
                .terms
                .into_iter()
                .map(|t| Clause::Fuzzy(TermClause::new(Field::Contents, t))),
        )
    }

    fn enter_clause(&mut self, occur: Occur, _clause: &Clause) -> bool {
        occur != Occur::MustNot
    }
}
