//! Expands working sets into their member projects.

use std::collections::BTreeMap;

use hunt_config::Config;

use crate::{
    clause::{Clause, TermClause},
    field::Field,
    visit::Visitor,
};

/// Source of working set membership.
pub trait WorkingSets {
    /// Returns the project names in `working_set`; empty when it is unknown.
    fn projects(&self, working_set: &str) -> Vec<String>;
}

impl WorkingSets for Config {
    fn projects(&self, working_set: &str) -> Vec<String> {
        self.working_set(working_set)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }
}

impl WorkingSets for BTreeMap<String, Vec<String>> {
    fn projects(&self, working_set: &str) -> Vec<String> {
        self.get(working_set).cloned().unwrap_or_default()
    }
}

/// Rewrites `ws:name` into an OR of `proj:` terms.
///
/// A working set without members stays a literal term, which matches nothing.
pub struct WorkingSetExpander<'a> {
    /// Membership lookup.
    working_sets: &'a dyn WorkingSets,
}

impl<'a> WorkingSetExpander<'a> {
    /// Creates an expander resolving names through `working_sets`.
    pub fn new(working_sets: &'a dyn WorkingSets) -> Self {
        Self { working_sets }
    }
}

impl Visitor for WorkingSetExpander<'_> {
    fn visit_term(&mut self, term: TermClause) -> Clause {
        if !term.field.is(Field::Ws) {
            return Clause::Term(term);
        }
        let projects = self.working_sets.projects(&term.text);
        if projects.is_empty() {
            return Clause::Term(term);
        }
        Clause::should(
            projects
                .into_iter()
                .filter(|p| !p.is_empty())
                .map(|p| Field::Proj.create_term(p)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visit::rewrite;

    fn sets() -> BTreeMap<String, Vec<String>> {
        BTreeMap::from([
            ("backend".to_string(), vec!["core".to_string(), "api".to_string()]),
            ("empty".to_string(), Vec::new()),
        ])
    }

    #[test]
    fn expands_members() {
        let sets = sets();
        let out = rewrite(
            &mut WorkingSetExpander::new(&sets),
            Field::Ws.create_term("backend"),
        );
        assert_eq!(out.to_string(), "proj:core proj:api");
    }

    #[test]
    fn unknown_or_empty_sets_stay_literal() {
        let sets = sets();
        for name in ["empty", "missing"] {
            let out = rewrite(
                &mut WorkingSetExpander::new(&sets),
                Field::Ws.create_term(name),
            );
            assert_eq!(out, Field::Ws.create_term(name));
        }
    }
}
