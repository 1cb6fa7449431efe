//! Query syntax tree.
//!
//! Represents parsed query strings before they are turned into index clauses.

use std::fmt;

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    /// A bare value. May contain `*` or `?` wildcards.
    Term(String),

    /// A quoted value, kept verbatim (quotes stripped).
    ///
    /// Whether this becomes a phrase or a single keyword depends on the field
    /// it is searched in, so no splitting happens here.
    Phrase(String),

    /// Negation: results must NOT match this expression.
    Not(Box<Self>),

    /// Conjunction: all sub-expressions must match.
    And(Vec<Self>),

    /// Disjunction: at least one sub-expression must match.
    Or(Vec<Self>),

    /// Field-scoped query.
    Field {
        /// Field name exactly as typed (e.g. `ext`, `project`, `Modified`).
        name: String,
        /// Expression to match within that field.
        expr: Box<Self>,
    },

    /// Boosted query: multiplies the score of the inner expression.
    Boost {
        /// The expression to boost.
        expr: Box<Self>,
        /// The boost factor.
        factor: f32,
    },
}

impl QueryExpr {
    /// Creates an And expression, flattening nested Ands.
    pub fn and(exprs: Vec<Self>) -> Self {
        let mut flattened: Vec<Self> = exprs
            .into_iter()
            .flat_map(|e| match e {
                Self::And(inner) => inner,
                other => vec![other],
            })
            .collect();

        if flattened.len() == 1
            && let Some(only) = flattened.pop()
        {
            return only;
        }
        Self::And(flattened)
    }

    /// Creates an Or expression, flattening nested Ors.
    pub fn or(exprs: Vec<Self>) -> Self {
        let mut flattened: Vec<Self> = exprs
            .into_iter()
            .flat_map(|e| match e {
                Self::Or(inner) => inner,
                other => vec![other],
            })
            .collect();

        if flattened.len() == 1
            && let Some(only) = flattened.pop()
        {
            return only;
        }
        Self::Or(flattened)
    }

    /// Creates a boosted expression.
    pub fn boost(expr: Self, factor: f32) -> Self {
        Self::Boost {
            expr: Box::new(expr),
            factor,
        }
    }

    /// Returns true if the expression contains a field-scoped part anywhere.
    pub fn has_field(&self) -> bool {
        match self {
            Self::Field { .. } => true,
            Self::Term(_) | Self::Phrase(_) => false,
            Self::Not(inner) => inner.has_field(),
            Self::Boost { expr, .. } => expr.has_field(),
            Self::And(exprs) | Self::Or(exprs) => exprs.iter().any(Self::has_field),
        }
    }

    /// Formats the expression as a tree structure with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term(s) => writeln!(f, "{prefix}Term({s:?})"),
            Self::Phrase(text) => writeln!(f, "{prefix}Phrase({text:?})"),
            Self::Not(inner) => {
                writeln!(f, "{prefix}Not")?;
                inner.fmt_tree(f, indent + 1)
            }
            Self::And(exprs) => {
                writeln!(f, "{prefix}And")?;
                for expr in exprs {
                    expr.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Or(exprs) => {
                writeln!(f, "{prefix}Or")?;
                for expr in exprs {
                    expr.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Field { name, expr } => {
                writeln!(f, "{prefix}Field({name:?})")?;
                expr.fmt_tree(f, indent + 1)
            }
            Self::Boost { expr, factor } => {
                writeln!(f, "{prefix}Boost({factor})")?;
                expr.fmt_tree(f, indent + 1)
            }
        }
    }

    /// Formats the expression back into query-string form.
    ///
    /// This produces output like: `ext:java (reader OR writer) -test`
    pub fn to_query_string(&self) -> String {
        self.fmt_query_string(false)
    }

    /// Internal helper for query string formatting.
    fn fmt_query_string(&self, in_field: bool) -> String {
        match self {
            Self::Term(s) => s.clone(),
            Self::Phrase(text) => format!("\"{text}\""),
            Self::Not(inner) => format!("-{}", inner.fmt_query_string(in_field)),
            Self::And(exprs) => {
                let parts: Vec<String> =
                    exprs.iter().map(|e| e.fmt_query_string(in_field)).collect();
                if in_field && parts.len() > 1 {
                    format!("({})", parts.join(" "))
                } else {
                    parts.join(" ")
                }
            }
            Self::Or(exprs) => {
                let parts: Vec<String> =
                    exprs.iter().map(|e| e.fmt_query_string(in_field)).collect();
                if parts.len() > 1 {
                    format!("({})", parts.join(" OR "))
                } else {
                    parts.join(" OR ")
                }
            }
            Self::Field { name, expr } => {
                format!("{}:{}", name, expr.fmt_query_string(true))
            }
            Self::Boost { expr, factor } => {
                format!("{}^{}", expr.fmt_query_string(in_field), factor)
            }
        }
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> QueryExpr {
        QueryExpr::Term(s.into())
    }

    #[test]
    fn and_flattens_nested() {
        let nested = QueryExpr::and(vec![
            term("a"),
            QueryExpr::And(vec![term("b"), term("c")]),
        ]);

        assert_eq!(
            nested,
            QueryExpr::And(vec![term("a"), term("b"), term("c")])
        );
    }

    #[test]
    fn and_single_element_unwraps() {
        assert_eq!(QueryExpr::and(vec![term("a")]), term("a"));
    }

    #[test]
    fn or_flattens_nested() {
        let nested = QueryExpr::or(vec![term("a"), QueryExpr::Or(vec![term("b"), term("c")])]);
        assert_eq!(nested, QueryExpr::Or(vec![term("a"), term("b"), term("c")]));
    }

    #[test]
    fn has_field_looks_through_wrappers() {
        let expr = QueryExpr::and(vec![
            term("reader"),
            QueryExpr::Not(Box::new(QueryExpr::Field {
                name: "ext".into(),
                expr: Box::new(term("xml")),
            })),
        ]);
        assert!(expr.has_field());
        assert!(!QueryExpr::or(vec![term("a"), term("b")]).has_field());
    }

    #[test]
    fn query_string_round_trips_shape() {
        let expr = QueryExpr::and(vec![
            QueryExpr::Field {
                name: "proj".into(),
                expr: Box::new(QueryExpr::Phrase("my app".into())),
            },
            QueryExpr::or(vec![term("reader"), term("writer")]),
        ]);
        assert_eq!(expr.to_query_string(), "proj:\"my app\" (reader OR writer)");
    }
}
