//! Tokens command implementation.
//!
//! Prints the token stream for a filter expression without building a tree.

use filter_ast_rs::filter::{tokenize, FilterError};

use super::{read_expression, CommandContext, Result};
use crate::output::{format_tokens_json, format_tokens_table};

/// Options for the tokens command.
#[derive(Debug)]
pub struct TokensOptions {
    /// Expression text; `None` or `-` reads stdin.
    pub expression: Option<String>,
}

/// Executes the tokens command.
pub fn execute(ctx: &CommandContext, opts: &TokensOptions) -> Result<()> {
    let input = read_expression(opts.expression.as_deref())?;
    let tokens = tokenize(&input).map_err(FilterError::from)?;

    if ctx.json_output {
        println!("{}", format_tokens_json(&tokens)?);
    } else if !ctx.quiet {
        print!("{}", format_tokens_table(&tokens, ctx.use_colors));
    }

    Ok(())
}
