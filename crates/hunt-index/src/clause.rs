//! Clause tree: the structured form of a search query.
//!
//! A parsed query is a tree of [`Clause`]s. Rewrite stages transform the tree (see
//! [`crate::visit`] and [`crate::rewrite`]) before it is compiled onto the index. Boolean
//! clauses own their children; trees are never shared.

use std::fmt;

use crate::field::Field;

/// Occurrence requirement of a boolean child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occur {
    /// The child must match.
    Must,
    /// The child may match and contributes to the score.
    Should,
    /// The child must not match.
    MustNot,
}

impl Occur {
    /// Lucene-style prefix used when rendering a boolean.
    fn prefix(self) -> &'static str {
        match self {
            Self::Must => "+",
            Self::Should => "",
            Self::MustNot => "-",
        }
    }
}

/// Field a clause targets.
///
/// Names the user typed that are not canonical field names are kept verbatim so a later
/// rewrite can resolve aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    /// A known field.
    Known(Field),
    /// An unrecognized field name, as typed.
    Unknown(String),
}

impl FieldRef {
    /// Resolves a typed field name against canonical names only.
    pub fn parse(name: &str) -> Self {
        Field::by_name(name).map_or_else(|| Self::Unknown(name.to_string()), Self::Known)
    }

    /// Returns the known field, if any.
    pub fn known(&self) -> Option<Field> {
        match self {
            Self::Known(field) => Some(*field),
            Self::Unknown(_) => None,
        }
    }

    /// Returns true if this is `field`.
    pub fn is(&self, field: Field) -> bool {
        self.known() == Some(field)
    }

    /// Name used when rendering.
    pub fn name(&self) -> &str {
        match self {
            Self::Known(field) => field.name(),
            Self::Unknown(name) => name,
        }
    }
}

impl From<Field> for FieldRef {
    fn from(field: Field) -> Self {
        Self::Known(field)
    }
}

/// A single-value clause: term, prefix, wildcard pattern or fuzzy term.
#[derive(Debug, Clone, PartialEq)]
pub struct TermClause {
    /// Target field.
    pub field: FieldRef,
    /// Term text, prefix, or glob pattern.
    pub text: String,
    /// Score multiplier.
    pub boost: f32,
}

impl TermClause {
    /// Creates a clause with boost 1.
    pub fn new(field: impl Into<FieldRef>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
            boost: 1.0,
        }
    }

    /// Sets the boost.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

/// Ordered terms that must appear within `slop` positions of each other.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseClause {
    /// Target field.
    pub field: FieldRef,
    /// Terms in order.
    pub terms: Vec<String>,
    /// Allowed positional distance.
    pub slop: u32,
    /// Score multiplier.
    pub boost: f32,
}

/// Inclusive numeric range.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeClause {
    /// Target field.
    pub field: Field,
    /// Lower bound, inclusive.
    pub lower: i64,
    /// Upper bound, inclusive.
    pub upper: i64,
    /// Score multiplier.
    pub boost: f32,
}

/// Boolean combination of child clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanClause {
    /// Children with their occurrence requirements, in order.
    pub clauses: Vec<(Occur, Clause)>,
    /// Score multiplier.
    pub boost: f32,
    /// Minimum number of SHOULD children that must match.
    pub minimum_should_match: usize,
}

impl BooleanClause {
    /// Creates an empty boolean with boost 1.
    pub fn new() -> Self {
        Self {
            clauses: Vec::new(),
            boost: 1.0,
            minimum_should_match: 0,
        }
    }

    /// Appends a child.
    pub fn add(&mut self, occur: Occur, clause: Clause) {
        self.clauses.push((occur, clause));
    }

    /// Appends a child, builder style.
    pub fn with(mut self, occur: Occur, clause: Clause) -> Self {
        self.add(occur, clause);
        self
    }
}

impl Default for BooleanClause {
    fn default() -> Self {
        Self::new()
    }
}

/// A node of the clause tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact term.
    Term(TermClause),
    /// Terms starting with the text.
    Prefix(TermClause),
    /// Terms matching a `*`/`?` glob.
    Wildcard(TermClause),
    /// Terms within a small edit distance.
    Fuzzy(TermClause),
    /// Phrase.
    Phrase(PhraseClause),
    /// Numeric range.
    Range(RangeClause),
    /// Boolean combination.
    Boolean(BooleanClause),
}

impl Clause {
    /// Creates a boolean of SHOULD children.
    pub fn should(children: impl IntoIterator<Item = Self>) -> Self {
        Self::Boolean(BooleanClause {
            clauses: children.into_iter().map(|c| (Occur::Should, c)).collect(),
            ..BooleanClause::new()
        })
    }

    /// Returns the boost.
    pub fn boost(&self) -> f32 {
        match self {
            Self::Term(t) | Self::Prefix(t) | Self::Wildcard(t) | Self::Fuzzy(t) => t.boost,
            Self::Phrase(p) => p.boost,
            Self::Range(r) => r.boost,
            Self::Boolean(b) => b.boost,
        }
    }

    /// Sets the boost.
    pub fn set_boost(&mut self, boost: f32) {
        match self {
            Self::Term(t) | Self::Prefix(t) | Self::Wildcard(t) | Self::Fuzzy(t) => t.boost = boost,
            Self::Phrase(p) => p.boost = boost,
            Self::Range(r) => r.boost = boost,
            Self::Boolean(b) => b.boost = boost,
        }
    }

    /// Sets the boost, builder style.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.set_boost(boost);
        self
    }

    /// Returns true for a boolean without children.
    pub fn is_empty_boolean(&self) -> bool {
        matches!(self, Self::Boolean(b) if b.clauses.is_empty())
    }

    /// Renders the clause, wrapping booleans in parentheses when nested.
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self {
            Self::Term(t) => write!(f, "{}:{}", t.field.name(), t.text)?,
            Self::Prefix(t) => write!(f, "{}:{}*", t.field.name(), t.text)?,
            Self::Wildcard(t) => write!(f, "{}:{}", t.field.name(), t.text)?,
            Self::Fuzzy(t) => write!(f, "{}:{}~", t.field.name(), t.text)?,
            Self::Phrase(p) => {
                write!(f, "{}:\"{}\"", p.field.name(), p.terms.join(" "))?;
                if p.slop > 0 {
                    write!(f, "~{}", p.slop)?;
                }
            }
            Self::Range(r) => write!(f, "{}:[{} TO {}]", r.field.name(), r.lower, r.upper)?,
            Self::Boolean(b) => {
                let wrap = nested || b.boost != 1.0;
                if wrap {
                    f.write_str("(")?;
                }
                for (i, (occur, child)) in b.clauses.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    f.write_str(occur.prefix())?;
                    child.fmt_nested(f, true)?;
                }
                if wrap {
                    f.write_str(")")?;
                }
                if b.minimum_should_match > 0 {
                    write!(f, "~{}", b.minimum_should_match)?;
                }
            }
        }
        let boost = self.boost();
        if boost != 1.0 {
            write!(f, "^{boost}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_nested(f, false)
    }
}
