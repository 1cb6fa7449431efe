//! Adds prefix completion to the last term of the query, for search as you type.
//!
//! "Last" is structural: a counter is raised by the number of children of every boolean
//! entered and lowered for every child visited, so it is zero exactly when the final child
//! of every enclosing boolean is being visited. Negated children are counted but never
//! descended into.

use crate::{
    clause::{BooleanClause, Clause, Occur, TermClause},
    visit::Visitor,
};

/// Rewrites the last term into `term OR term*^(boost/4)`.
#[derive(Debug)]
pub struct LastTermPrefixer {
    /// Children announced but not yet visited.
    remaining: usize,
    /// Shortest term that receives a prefix.
    min_length: usize,
}

impl LastTermPrefixer {
    /// Creates a prefixer skipping terms shorter than `min_length` characters.
    pub fn new(min_length: usize) -> Self {
        Self {
            remaining: 0,
            min_length,
        }
    }
}

impl Visitor for LastTermPrefixer {
    fn visit_term(&mut self, term: TermClause) -> Clause {
        if self.remaining != 0 || term.text.chars().count() < self.min_length {
            return Clause::Term(term);
        }
        let prefix = TermClause::new(term.field.clone(), term.text.clone())
            .with_boost(term.boost / 4.0);
        Clause::should([Clause::Term(term), Clause::Prefix(prefix)])
    }

    fn visit_boolean(&mut self, boolean: BooleanClause) -> BooleanClause {
        self.remaining += boolean.clauses.len();
        boolean
    }

    fn enter_clause(&mut self, occur: Occur, _clause: &Clause) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        occur != Occur::MustNot
    }
}
