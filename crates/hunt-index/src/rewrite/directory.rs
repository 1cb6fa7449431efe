//! Rewrites directory clauses onto file path matches.
//!
//! File paths are stored as `/<project>/<relative path>`. An absolute directory (`/core/src`)
//! becomes a path prefix; a relative one (`src`) matches as any path segment.

use crate::{
    clause::{Clause, TermClause},
    field::Field,
    visit::Visitor,
};

/// Moves `dir:` clauses onto the `file` field.
#[derive(Debug, Default)]
pub struct DirectoryRewriter;

impl DirectoryRewriter {
    /// Returns true if the clause targets directories.
    fn applies(clause: &TermClause) -> bool {
        clause.field.is(Field::Dir)
    }
}

/// Creates a file-field clause.
fn file(text: String) -> TermClause {
    TermClause::new(Field::File, text)
}

impl Visitor for DirectoryRewriter {
    fn visit_term(&mut self, term: TermClause) -> Clause {
        if !Self::applies(&term) {
            return Clause::Term(term);
        }
        if term.text.starts_with('/') {
            Clause::Prefix(file(term.text))
        } else {
            Clause::Wildcard(file(format!("/*/{}/*", term.text)))
        }
    }

    fn visit_prefix(&mut self, prefix: TermClause) -> Clause {
        if !Self::applies(&prefix) {
            return Clause::Prefix(prefix);
        }
        if prefix.text.starts_with('/') {
            Clause::Prefix(file(prefix.text))
        } else {
            Clause::Wildcard(file(format!("/*/{}*/*", prefix.text)))
        }
    }

    fn visit_wildcard(&mut self, wildcard: TermClause) -> Clause {
        if !Self::applies(&wildcard) {
            return Clause::Wildcard(wildcard);
        }
        if wildcard.text.starts_with('/') {
            Clause::Wildcard(file(wildcard.text))
        } else {
            Clause::Wildcard(file(format!("/*/{}", wildcard.text)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visit::rewrite;

    fn dir(kind: fn(TermClause) -> Clause, text: &str) -> Clause {
        kind(TermClause::new(Field::Dir, text))
    }

    #[test]
    fn absolute_directories_become_prefixes() {
        let out = rewrite(&mut DirectoryRewriter, dir(Clause::Term, "/core/src"));
        assert_eq!(out.to_string(), "file:/core/src*");
        let out = rewrite(&mut DirectoryRewriter, dir(Clause::Prefix, "/core/sr"));
        assert_eq!(out.to_string(), "file:/core/sr*");
        let out = rewrite(&mut DirectoryRewriter, dir(Clause::Wildcard, "/core/*/main"));
        assert_eq!(out.to_string(), "file:/core/*/main");
    }

    #[test]
    fn relative_directories_match_any_segment() {
        let out = rewrite(&mut DirectoryRewriter, dir(Clause::Term, "src"));
        assert_eq!(out.to_string(), "file:/*/src/*");
        let out = rewrite(&mut DirectoryRewriter, dir(Clause::Prefix, "sr"));
        assert_eq!(out.to_string(), "file:/*/sr*/*");
        let out = rewrite(&mut DirectoryRewriter, dir(Clause::Wildcard, "s?c/*"));
        assert_eq!(out.to_string(), "file:/*/s?c/*");
    }

    #[test]
    fn boost_is_kept() {
        let out = rewrite(
            &mut DirectoryRewriter,
            dir(Clause::Term, "src").with_boost(3.0),
        );
        assert_eq!(out.boost(), 3.0);
    }
}
