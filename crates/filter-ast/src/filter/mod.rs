//! Filter expression tokenizer and syntax tree builder.
//!
//! This module turns search-engine style filter strings into a typed syntax
//! tree. It does not evaluate filters; the tree is handed to whatever walks
//! it against stored documents.
//!
//! # Supported Syntax
//!
//! ## Comparison
//! - `rating >= 3`, `price < 100`, `slug = "seo"`, `slug != seo`
//!
//! ## Set membership
//! - `genre IN ["drama", "comedy"]`, `genre NOT IN []`
//!
//! ## Range
//! - `price 10 TO 100`
//!
//! ## Existence, null and empty checks
//! - `cover EXISTS`, `cover NOT EXISTS`
//! - `cover IS NULL`, `cover IS NOT NULL`
//! - `tags IS EMPTY`, `tags IS NOT EMPTY`
//!
//! ## String matching
//! - `title CONTAINS "night"`, `title NOT CONTAINS night`
//! - `title STARTS WITH the`, `title NOT STARTS WITH the`
//!
//! ## Geo functions
//! - `_geoRadius(48.85, 2.35, 2000)`
//! - `_geoBoundingBox([48.9, 2.2], [48.8, 2.4])`
//!
//! ## Boolean Operators
//! - `NOT` - binds to the following predicate or group
//! - `AND` - binds tighter than `OR`
//! - `OR`
//! - `()` - Grouping
//!
//! Literals may be quoted with `"` or `'`; a quoted field name allows spaces.
//!
//! # Example
//!
//! ```
//! use filter_ast_rs::filter::{FilterParser, Literal, Node, Operator};
//!
//! let tree = FilterParser::parse(r#"subcategory.slug = "seo" AND rating >= 3"#).unwrap();
//! assert_eq!(
//!     tree,
//!     Node::and(vec![
//!         Node::predicate("subcategory.slug", Operator::Equal, vec![Literal::from("seo")]),
//!         Node::predicate("rating", Operator::GreaterThanOrEqual, vec![Literal::Number(3.0)]),
//!     ])
//! );
//! assert_eq!(tree.to_string(), r#"subcategory.slug = "seo" AND rating >= 3"#);
//! ```

mod ast;
mod catalog;
mod error;
mod lexer;
mod parser;

pub use ast::{Literal, Node, GEO_FIELD};
pub use catalog::{
    keyword_operators, longest_comparison_operator, longest_connective, suggest_operator, Arity,
    Connective, Operator, OperatorCategory,
};
pub use error::{FilterError, FilterResult, LexError, LexResult, ParseError, ParseResult};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use parser::{FilterParser, DEFAULT_MAX_DEPTH};
