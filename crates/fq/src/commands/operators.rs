//! Operators command implementation.

use super::{CommandContext, Result};
use crate::output::{format_operators_json, format_operators_table};

/// Executes the operators command.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    if ctx.json_output {
        println!("{}", format_operators_json()?);
    } else if !ctx.quiet {
        print!("{}", format_operators_table(ctx.use_colors));
    }

    Ok(())
}
