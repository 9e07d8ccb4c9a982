//! Tokenizer and syntax tree builder for search filter expressions.
//!
//! This crate parses filter strings such as
//! `genre IN ["drama", "comedy"] AND NOT rating < 2` into a typed tree of
//! predicates and boolean connectives. Parsing is pure: no I/O, no shared
//! state, and each call is independent.

pub mod filter;

pub use filter::{FilterError, FilterParser, FilterResult, Literal, Node};
