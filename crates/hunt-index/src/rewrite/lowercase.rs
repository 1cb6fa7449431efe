//! Lowercases contents clauses to match the lowercased contents index.

use crate::{
    clause::{Clause, PhraseClause, TermClause},
    field::Field,
    visit::Visitor,
};

/// Lowercases contents terms, prefixes, wildcards and phrases.
#[derive(Debug, Default)]
pub struct Lowercaser;

impl Lowercaser {
    /// Returns the clause with lowercase text when it targets contents.
    fn lower(clause: TermClause) -> TermClause {
        if clause.field.is(Field::Contents) {
            TermClause {
                text: clause.text.to_lowercase(),
                ..clause
            }
        } else {
            clause
        }
    }
}

impl Visitor for Lowercaser {
    fn visit_term(&mut self, term: TermClause) -> Clause {
        Clause::Term(Self::lower(term))
    }

    fn visit_prefix(&mut self, prefix: TermClause) -> Clause {
        Clause::Prefix(Self::lower(prefix))
    }

    fn visit_wildcard(&mut self, wildcard: TermClause) -> Clause {
        Clause::Wildcard(Self::lower(wildcard))
    }

    fn visit_phrase(&mut self, phrase: PhraseClause) -> Clause {
        if !phrase.field.is(Field::Contents) {
            return Clause::Phrase(phrase);
        }
        Clause::Phrase(PhraseClause {
            terms: phrase.terms.iter().map(|t| t.to_lowercase()).collect(),
            ..phrase
        })
    }
}
