//! Query-string parsing for hunt code search.
//!
//! Users type queries incrementally, so the language is small and forgiving:
//!
//! - **Terms**: `HashMap` - words to look for in file contents
//! - **Wildcards**: `get*Name`, `Abstract?ase` - `*` and `?` glob characters
//! - **Phrases**: `"new HashMap"` - quoted text, analysed as a sequence
//! - **Negation**: `-test` - terms that must NOT appear
//! - **OR / AND**: `list OR vector`, `foo AND bar` - explicit connectives
//! - **Grouping**: `(a b) OR (c d)` - precedence control
//! - **Fields**: `ext:java`, `proj:core,api`, `modified:today` - search specific fields
//! - **Boosting**: `reader^2.5` - adjust term importance
//!
//! Field names are kept verbatim; resolving them to index fields (and their
//! aliases) is left to the caller.
//!
//! # Example
//!
//! ```
//! use hunt_query::parse;
//!
//! let expr = parse("ext:java (reader OR writer) -test").unwrap();
//! assert!(expr.is_some());
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::QueryExpr;
pub use error::{LexError, ParseError, QueryError, QueryErrorKind};
pub use lexer::{Token, tokenize};
pub use parser::parse;
