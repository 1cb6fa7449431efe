//! Resolves field aliases such as `project:` and `type:`.

use crate::{
    clause::{Clause, FieldRef, TermClause},
    field::Field,
    visit::Visitor,
};

/// Moves clauses with an aliased field name onto the canonical field.
///
/// The clause kind is preserved: a term stays a term, a prefix stays a prefix.
#[derive(Debug, Default)]
pub struct AliasResolver;

impl AliasResolver {
    /// Returns the clause retargeted to the aliased field, if its field is an alias.
    fn resolve(clause: TermClause) -> Result<TermClause, TermClause> {
        let FieldRef::Unknown(name) = &clause.field else {
            return Err(clause);
        };
        match Field::by_alias(name) {
            Some(field) => Ok(TermClause::new(field, clause.text)),
            None => Err(clause),
        }
    }
}

impl Visitor for AliasResolver {
    fn visit_term(&mut self, term: TermClause) -> Clause {
        Clause::Term(Self::resolve(term).unwrap_or_else(|t| t))
    }

    fn visit_prefix(&mut self, prefix: TermClause) -> Clause {
        Clause::Prefix(Self::resolve(prefix).unwrap_or_else(|t| t))
    }

    fn visit_wildcard(&mut self, wildcard: TermClause) -> Clause {
        Clause::Wildcard(Self::resolve(wildcard).unwrap_or_else(|t| t))
    }
}
