//! Clause tree traversal for rewrite stages.
//!
//! A [`Visitor`] is asked what each node should become. [`rewrite`] drives the traversal:
//!
//! - `init` sees the untransformed root once before anything else.
//! - Term, prefix and wildcard nodes are replaced by whatever the visitor returns; the
//!   replacement always takes over the original node's boost.
//! - A boolean node is handed to the visitor before its children and may be replaced by
//!   another boolean. Each child of the result is offered through `enter_clause`; declining
//!   keeps that child's subtree untouched. The boolean is then rebuilt with the boost and
//!   minimum-should-match the visitor returned.
//! - Phrases are replaced outright, without descending.
//! - `end` sees the fully transformed tree and may wrap it.
//!
//! The input tree is consumed; callers always continue with the returned tree.

use crate::clause::{BooleanClause, Clause, Occur, PhraseClause, TermClause};

/// A rewrite stage over a clause tree.
///
/// Every method has an identity default, so a stage only overrides what it changes.
pub trait Visitor {
    /// Called once with the root before traversal.
    fn init(&mut self, _root: &Clause) {}

    /// Replaces a term.
    fn visit_term(&mut self, term: TermClause) -> Clause {
        Clause::Term(term)
    }

    /// Replaces a prefix.
    fn visit_prefix(&mut self, prefix: TermClause) -> Clause {
        Clause::Prefix(prefix)
    }

    /// Replaces a wildcard.
    fn visit_wildcard(&mut self, wildcard: TermClause) -> Clause {
        Clause::Wildcard(wildcard)
    }

    /// Replaces a phrase. Phrases are not descended into.
    fn visit_phrase(&mut self, phrase: PhraseClause) -> Clause {
        Clause::Phrase(phrase)
    }

    /// Replaces a boolean before its children are visited.
    fn visit_boolean(&mut self, boolean: BooleanClause) -> BooleanClause {
        boolean
    }

    /// Decides whether a boolean child is visited.
    fn enter_clause(&mut self, _occur: Occur, _clause: &Clause) -> bool {
        true
    }

    /// Replaces any other node (fuzzy, range).
    fn visit_other(&mut self, clause: Clause) -> Clause {
        clause
    }

    /// Called once with the transformed tree.
    fn end(&mut self, root: Clause) -> Clause {
        root
    }
}

/// Runs `visitor` over `root` and returns the transformed tree.
pub fn rewrite<V: Visitor + ?Sized>(visitor: &mut V, root: Clause) -> Clause {
    visitor.init(&root);
    let transformed = walk(visitor, root);
    visitor.end(transformed)
}

/// Transforms one node and, for booleans, its children.
fn walk<V: Visitor + ?Sized>(visitor: &mut V, clause: Clause) -> Clause {
    match clause {
        Clause::Term(term) => {
            let boost = term.boost;
            visitor.visit_term(term).with_boost(boost)
        }
        Clause::Prefix(prefix) => {
            let boost = prefix.boost;
            visitor.visit_prefix(prefix).with_boost(boost)
        }
        Clause::Wildcard(wildcard) => {
            let boost = wildcard.boost;
            visitor.visit_wildcard(wildcard).with_boost(boost)
        }
        Clause::Phrase(phrase) => visitor.visit_phrase(phrase),
        Clause::Boolean(boolean) => {
            let BooleanClause {
                clauses,
                boost,
                minimum_should_match,
            } = visitor.visit_boolean(boolean);
            let clauses = clauses
                .into_iter()
                .map(|(occur, child)| {
                    if visitor.enter_clause(occur, &child) {
                        (occur, walk(visitor, child))
                    } else {
                        (occur, child)
                    }
                })
                .collect();
            Clause::Boolean(BooleanClause {
                clauses,
                boost,
                minimum_should_match,
            })
        }
        other => visitor.visit_other(other),
    }
}
