//! Parse command implementation.
//!
//! Builds the syntax tree for a filter expression and prints it.

use tracing::debug;

use super::{read_expression, CommandContext, Result};
use crate::output::{format_tree, format_tree_json};

/// Options for the parse command.
#[derive(Debug)]
pub struct ParseOptions {
    /// Expression text; `None` or `-` reads stdin.
    pub expression: Option<String>,
    /// Print the canonical filter string instead of the tree.
    pub canonical: bool,
}

/// Executes the parse command.
pub fn execute(ctx: &CommandContext, opts: &ParseOptions) -> Result<()> {
    let input = read_expression(opts.expression.as_deref())?;
    debug!(input = %input, "parsing filter");

    let tree = ctx.parser().parse_str(&input)?;

    if ctx.json_output {
        println!("{}", format_tree_json(&tree)?);
    } else if !ctx.quiet {
        if opts.canonical {
            println!("{tree}");
        } else {
            print!("{}", format_tree(&tree, ctx.use_colors));
        }
    }

    Ok(())
}
