//! Command implementations for the fq CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod operators;
pub mod parse;
pub mod tokens;

use std::env;
use std::io::{self, Read};

use filter_ast_rs::filter::{FilterError, FilterParser, DEFAULT_MAX_DEPTH};

use crate::cli::Cli;
use config::{Config, OutputFormat};

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Tokenizing or parsing error.
    #[error("{0}")]
    Filter(#[from] FilterError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    /// Returns a "did you mean" operator hint, if one applies.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            CommandError::Filter(e) => e.suggestion(),
            _ => None,
        }
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
    /// Nesting limit passed to the parser.
    pub max_depth: Option<usize>,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && env::var_os("NO_COLOR").is_none(),
            quiet: cli.quiet,
            verbose: cli.verbose,
            max_depth: cli.max_depth.map(|n| n as usize),
        }
    }

    /// Fills in settings the command line left open from the config file.
    pub fn with_config(mut self, config: &Config) -> Self {
        if config.output.format == Some(OutputFormat::Json) {
            self.json_output = true;
        }
        if config.output.color == Some(false) {
            self.use_colors = false;
        }
        if self.max_depth.is_none() {
            self.max_depth = config.parser.max_depth;
        }
        self
    }

    /// Returns a parser configured for this invocation.
    pub fn parser(&self) -> FilterParser {
        FilterParser::new().with_max_depth(self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH))
    }
}

/// Returns the expression argument, or stdin when it is absent or `-`.
///
/// A single trailing newline from stdin is dropped.
pub fn read_expression(expression: Option<&str>) -> Result<String> {
    match expression {
        Some(text) if text != "-" => Ok(text.to_string()),
        _ => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            if input.ends_with('\n') {
                input.pop();
                if input.ends_with('\r') {
                    input.pop();
                }
            }
            Ok(input)
        }
    }
}
