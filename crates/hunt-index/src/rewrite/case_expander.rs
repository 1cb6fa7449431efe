//! Expands multi-hump file names into name wildcards.
//!
//! `name:ABC` also matches `AbstractBaseClass.java` through the wildcard `A*B*C*`, and
//! `name:FooBar` matches `FooBarTest.java` through `Foo*Bar*`.

use crate::{
    clause::{Clause, TermClause},
    field::Field,
    visit::Visitor,
};

/// Returns true when `text` starts with an uppercase letter and has a second uppercase
/// letter after a run of lowercase letters, digits or underscores.
fn is_multi_hump(text: &str) -> bool {
    let mut chars = text.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_uppercase()) {
        return false;
    }
    chars
        .find(|c| !is_hump_tail(*c))
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Characters that continue a hump.
fn is_hump_tail(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

/// Appends `*` after every hump: `AbstractBase` becomes `Abstract*Base*`.
fn hump_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() * 2);
    let mut in_hump = false;
    for c in text.chars() {
        if in_hump && !is_hump_tail(c) {
            pattern.push('*');
            in_hump = false;
        }
        if c.is_ascii_uppercase() {
            in_hump = true;
        }
        pattern.push(c);
    }
    if in_hump {
        pattern.push('*');
    }
    pattern
}

/// Rewrites multi-hump name terms into `term OR wildcard^(boost/2)`.
#[derive(Debug, Default)]
pub struct CaseExpander;

impl Visitor for CaseExpander {
    fn visit_term(&mut self, term: TermClause) -> Clause {
        if !term.field.is(Field::Name) || !is_multi_hump(&term.text) {
            return Clause::Term(term);
        }
        let wildcard =
            TermClause::new(Field::Name, hump_pattern(&term.text)).with_boost(term.boost / 2.0);
        Clause::should([Clause::Term(term), Clause::Wildcard(wildcard)])
    }
}
