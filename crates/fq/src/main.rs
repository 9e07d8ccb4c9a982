use clap::Parser;
use std::process::ExitCode;
use tracing::debug;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::load_config;
use commands::{CommandContext, CommandError};
use dispatch::{Dispatch, FilterDispatch, NoConfigDispatch};
use filter_ast_rs::filter::FilterError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                        "suggestion": e.suggestion(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
                if let Some(suggestion) = e.suggestion() {
                    eprintln!("hint: did you mean {suggestion}?");
                }
            }
            error_exit_code(&e)
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    let ctx = CommandContext::from_cli(cli);

    // Config and completions must work with a missing or broken config file
    if let Some(dispatch) = NoConfigDispatch::try_from_cli(cli) {
        return dispatch.execute(&ctx);
    }

    let config = load_config()?;
    let ctx = ctx.with_config(&config);
    debug!(
        json = ctx.json_output,
        color = ctx.use_colors,
        max_depth = ?ctx.max_depth,
        "resolved settings"
    );

    match FilterDispatch::from_cli(cli) {
        Some(dispatch) => dispatch.execute(&ctx),
        None => Ok(()),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Filter(FilterError::Lex(_)) => "LEX_ERROR",
        CommandError::Filter(FilterError::Parse(_)) => "PARSE_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    match e {
        CommandError::Filter(FilterError::Lex(_)) => ExitCode::from(1),
        CommandError::Filter(FilterError::Parse(_)) => ExitCode::from(2),
        CommandError::Io(_) => ExitCode::from(3),
        CommandError::Config(_) => ExitCode::from(5),
        CommandError::Json(_) => ExitCode::from(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filter_ast_rs::filter::{LexError, ParseError};

    #[test]
    fn test_error_codes() {
        let lex = CommandError::from(FilterError::from(LexError::UnbalancedListBrackets));
        assert_eq!(error_code(&lex), "LEX_ERROR");

        let parse = CommandError::from(FilterError::from(ParseError::EmptyExpression));
        assert_eq!(error_code(&parse), "PARSE_ERROR");

        let config = CommandError::Config("bad".to_string());
        assert_eq!(error_code(&config), "CONFIG_ERROR");

        let io = CommandError::from(std::io::Error::other("closed"));
        assert_eq!(error_code(&io), "IO_ERROR");
    }

    #[test]
    fn test_error_exit_codes() {
        let code = |e: CommandError| format!("{:?}", error_exit_code(&e));

        let lex = CommandError::from(FilterError::from(LexError::UnbalancedListBrackets));
        assert_eq!(code(lex), format!("{:?}", ExitCode::from(1)));

        let parse = CommandError::from(FilterError::from(ParseError::EmptyExpression));
        assert_eq!(code(parse), format!("{:?}", ExitCode::from(2)));

        let config = CommandError::Config("bad".to_string());
        assert_eq!(code(config), format!("{:?}", ExitCode::from(5)));
    }

    #[test]
    fn test_filter_error_message_is_unwrapped() {
        let e = CommandError::from(FilterError::from(ParseError::EmptyExpression));
        assert_eq!(e.to_string(), "filter expression is empty");
    }
}
