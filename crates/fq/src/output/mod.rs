//! Output formatting utilities for the fq CLI.
//!
//! This module provides functions for formatting results as text or JSON.
//! It is organized into submodules by command:
//!
//! - [`tree`] - Syntax tree output (parse)
//! - [`tokens`] - Token stream output (tokens)
//! - [`operators`] - Operator catalog output (operators)

mod operators;
mod tokens;
mod tree;

pub use operators::{format_operators_json, format_operators_table};
pub use tokens::{format_tokens_json, format_tokens_table};
pub use tree::{format_tree, format_tree_json};
