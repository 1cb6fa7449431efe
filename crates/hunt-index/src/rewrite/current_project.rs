//! Substitutes the current project for the `.` shorthand.

use crate::{
    clause::{Clause, TermClause},
    field::Field,
    visit::Visitor,
};

/// Term text standing for the current project.
pub const CURRENT_PROJECT: &str = ".";

/// Rewrites `proj:.` (or a bare `.`) into `proj:<current project>`.
#[derive(Debug)]
pub struct CurrentProjectSetter<'a> {
    /// Name of the current project.
    project: &'a str,
}

impl<'a> CurrentProjectSetter<'a> {
    /// Creates a setter substituting `project`.
    pub fn new(project: &'a str) -> Self {
        Self { project }
    }
}

impl Visitor for CurrentProjectSetter<'_> {
    fn visit_term(&mut self, term: TermClause) -> Clause {
        let applies = term.text == CURRENT_PROJECT
            && (term.field.is(Field::Proj) || term.field.is(Field::Contents));
        if applies {
            Field::Proj.create_term(self.project)
        } else {
            Clause::Term(term)
        }
    }
}
