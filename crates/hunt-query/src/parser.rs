//! Query parser.
//!
//! Parses a token stream into a query expression using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! query      → or_expr
//! or_expr    → and_expr ("OR" and_expr)*
//! and_expr   → unary ("AND"? unary)*
//! unary      → "-" unary | primary
//! primary    → (TERM | PHRASE | field_expr | "(" or_expr ")") BOOST?
//! field_expr → FIELD_PREFIX (TERM | PHRASE | "(" or_expr ")")
//! ```
//!
//! # Precedence (highest to lowest)
//!
//! 1. Grouping: `(...)`
//! 2. Field prefix: `field:`
//! 3. Negation: `-`
//! 4. AND (implicit between adjacent terms, or explicit keyword)
//! 5. OR (explicit keyword)

use std::mem;

use crate::{
    ast::QueryExpr,
    error::{ParseError, QueryError},
    lexer::{Token, tokenize},
};

/// Recursive descent parser for query expressions.
struct Parser {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in token stream.
    position: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses the token stream into a query expression.
    fn parse(mut self) -> Result<Option<QueryExpr>, ParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let expr = self.parse_or_expr()?;

        if let Some(token) = self.peek() {
            let message = match token {
                Token::RParen => "unexpected closing parenthesis".to_string(),
                other => format!("unexpected token: {other:?}"),
            };
            return Err(ParseError::new(message, Some(self.position)));
        }

        Ok(Some(expr))
    }

    /// Parses: or_expr → and_expr ("OR" and_expr)*
    fn parse_or_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut left = self.parse_and_expr()?;

        while self.check(&Token::Or) {
            self.advance();
            if self.peek().is_none() {
                return Err(ParseError::new(
                    "dangling OR (needs expression after it)",
                    Some(self.position),
                ));
            }
            let right = self.parse_and_expr()?;
            left = QueryExpr::or(vec![left, right]);
        }

        Ok(left)
    }

    /// Parses: and_expr → unary ("AND"? unary)*
    fn parse_and_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut exprs = vec![self.parse_unary()?];

        loop {
            if self.check(&Token::And) {
                self.advance();
                if !self.can_start_unary() {
                    return Err(ParseError::new(
                        "dangling AND (needs expression after it)",
                        Some(self.position),
                    ));
                }
            } else if !self.can_start_unary() {
                break;
            }
            exprs.push(self.parse_unary()?);
        }

        Ok(QueryExpr::and(exprs))
    }

    /// Checks if the current token can start a unary expression.
    fn can_start_unary(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Term(_)
                    | Token::Phrase(_)
                    | Token::Not
                    | Token::LParen
                    | Token::FieldPrefix(_)
            )
        )
    }

    /// Checks if the current token is a boost operator and applies it if so.
    fn maybe_apply_boost(&mut self, expr: QueryExpr) -> QueryExpr {
        if let Some(Token::Boost(factor)) = self.peek().cloned() {
            self.advance();
            QueryExpr::boost(expr, factor)
        } else {
            expr
        }
    }

    /// Parses: unary → "-" unary | primary
    fn parse_unary(&mut self) -> Result<QueryExpr, ParseError> {
        if self.check(&Token::Not) {
            self.advance();
            let expr = self.parse_unary()?;
            return Ok(QueryExpr::Not(Box::new(expr)));
        }

        self.parse_primary()
    }

    /// Parses: primary → TERM | PHRASE | field_expr | "(" or_expr ")", then an optional boost.
    fn parse_primary(&mut self) -> Result<QueryExpr, ParseError> {
        let expr = match self.peek().cloned() {
            Some(Token::Term(_) | Token::Phrase(_)) => self.parse_term_or_phrase()?,

            Some(Token::FieldPrefix(name)) => {
                self.advance();
                self.parse_field_expr(name)?
            }

            Some(Token::LParen) => self.parse_group("expected closing parenthesis")?,

            Some(Token::RParen) => {
                return Err(ParseError::new(
                    "unexpected closing parenthesis",
                    Some(self.position),
                ));
            }

            Some(Token::Or) => {
                return Err(ParseError::new(
                    "unexpected OR (needs expression before it)",
                    Some(self.position),
                ));
            }

            Some(Token::And) => {
                return Err(ParseError::new(
                    "unexpected AND (needs expression before it)",
                    Some(self.position),
                ));
            }

            Some(Token::Not) => {
                return Err(ParseError::new("unexpected negation", Some(self.position)));
            }

            Some(Token::Boost(_)) => {
                return Err(ParseError::new(
                    "unexpected boost (needs expression before it)",
                    Some(self.position),
                ));
            }

            None => {
                return Err(ParseError::new("unexpected end of query", None));
            }
        };

        Ok(self.maybe_apply_boost(expr))
    }

    /// Parses the expression after a field prefix.
    fn parse_field_expr(&mut self, name: String) -> Result<QueryExpr, ParseError> {
        let expr = match self.peek() {
            Some(Token::Term(_) | Token::Phrase(_)) => self.parse_term_or_phrase()?,
            Some(Token::LParen) => {
                self.parse_group("expected closing parenthesis after field expression")?
            }
            _ => {
                return Err(ParseError::new(
                    format!("expected term, phrase, or group after '{name}:'"),
                    Some(self.position),
                ));
            }
        };

        Ok(QueryExpr::Field {
            name,
            expr: Box::new(expr),
        })
    }

    /// Parses a TERM or PHRASE token, consuming it.
    fn parse_term_or_phrase(&mut self) -> Result<QueryExpr, ParseError> {
        let expr = match self.peek() {
            Some(Token::Term(text)) => QueryExpr::Term(text.clone()),
            Some(Token::Phrase(text)) => QueryExpr::Phrase(text.clone()),
            _ => {
                return Err(ParseError::new(
                    "expected term or phrase",
                    Some(self.position),
                ));
            }
        };
        self.advance();
        Ok(expr)
    }

    /// Parses a parenthesized group, consuming the surrounding parentheses.
    fn parse_group(&mut self, missing_rparen_msg: &str) -> Result<QueryExpr, ParseError> {
        self.advance();
        if self.check(&Token::RParen) {
            return Err(ParseError::new("empty group", Some(self.position)));
        }
        let inner = self.parse_or_expr()?;

        if !self.check(&Token::RParen) {
            return Err(ParseError::new(missing_rparen_msg, Some(self.position)));
        }
        self.advance();

        Ok(inner)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Checks if the current token matches the given token kind.
    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| mem::discriminant(t) == mem::discriminant(token))
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Parses a query string into an expression.
///
/// Returns `Ok(None)` for empty queries, `Ok(Some(expr))` for valid queries,
/// or `Err(QueryError)` for invalid syntax.
pub fn parse(input: &str) -> Result<Option<QueryExpr>, QueryError> {
    let tokens = tokenize(input).map_err(QueryError::from)?;
    Parser::new(tokens)
        .parse()
        .map_err(|e| QueryError::from(e).with_query(input))
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn term(s: &str) -> QueryExpr {
        QueryExpr::Term(s.into())
    }

    fn phrase(s: &str) -> QueryExpr {
        QueryExpr::Phrase(s.into())
    }

    fn not(e: QueryExpr) -> QueryExpr {
        QueryExpr::Not(Box::new(e))
    }

    fn and(exprs: Vec<QueryExpr>) -> QueryExpr {
        QueryExpr::and(exprs)
    }

    fn or(exprs: Vec<QueryExpr>) -> QueryExpr {
        QueryExpr::or(exprs)
    }

    fn field(name: &str, e: QueryExpr) -> QueryExpr {
        QueryExpr::Field {
            name: name.into(),
            expr: Box::new(e),
        }
    }

    #[test]
    fn empty_query() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn single_term() {
        assert_eq!(parse("HashMap").unwrap(), Some(term("HashMap")));
    }

    #[test]
    fn implicit_and() {
        assert_eq!(
            parse("another other").unwrap(),
            Some(and(vec![term("another"), term("other")]))
        );
    }

    #[test]
    fn explicit_and_matches_implicit() {
        assert_eq!(parse("a AND b").unwrap(), parse("a b").unwrap());
    }

    #[test]
    fn or_binds_looser_than_and() {
        assert_eq!(
            parse("a b OR c").unwrap(),
            Some(or(vec![and(vec![term("a"), term("b")]), term("c")]))
        );
    }

    #[test]
    fn negation_and_groups() {
        assert_eq!(
            parse("reader -(test OR mock)").unwrap(),
            Some(and(vec![
                term("reader"),
                not(or(vec![term("test"), term("mock")]))
            ]))
        );
    }

    #[test]
    fn field_values() {
        assert_eq!(
            parse("proj:core,api ext:java Foo").unwrap(),
            Some(and(vec![
                field("proj", term("core,api")),
                field("ext", term("java")),
                term("Foo")
            ]))
        );
    }

    #[test]
    fn field_phrase_kept_verbatim() {
        assert_eq!(
            parse("modified:\"3 days\"").unwrap(),
            Some(field("modified", phrase("3 days")))
        );
    }

    #[test]
    fn field_group() {
        assert_eq!(
            parse("ext:(java OR xml)").unwrap(),
            Some(field("ext", or(vec![term("java"), term("xml")])))
        );
    }

    #[test]
    fn boost_applies_to_primary() {
        assert_eq!(
            parse("reader^2 writer").unwrap(),
            Some(and(vec![QueryExpr::boost(term("reader"), 2.0), term("writer")]))
        );
    }

    #[test]
    fn unbalanced_parentheses() {
        let err = parse("(reader writer").unwrap_err();
        assert!(err.message().contains("closing parenthesis"));
        assert!(parse("reader)").is_err());
        assert!(parse("()").is_err());
    }

    #[test]
    fn dangling_connectives() {
        assert!(parse("OR reader").is_err());
        assert!(parse("reader OR").is_err());
        assert!(parse("reader AND").is_err());
        assert!(parse("-").is_err());
    }

    #[test]
    fn missing_field_value() {
        let err = parse("ext:").unwrap_err();
        assert!(err.message().contains("after 'ext:'"));
        assert_eq!(err.query.as_deref(), Some("ext:"));
    }

    #[test]
    fn lex_errors_surface_through_parse() {
        let err = parse("\"unterminated").unwrap_err();
        assert!(err.message().contains("unclosed quote"));
    }

    #[test]
    fn deeply_nested_input_is_fast() {
        let input = format!("{}x{}", "(".repeat(200), ")".repeat(200));
        let start = Instant::now();
        assert_eq!(parse(&input).unwrap(), Some(term("x")));
        assert!(start.elapsed().as_secs() < 1);
    }
}
