//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands are split by whether they read the config file: config and
//! completions must work even when the config file is broken.

use crate::cli::{Cli, Commands, ConfigCommands, Shell};
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for dispatched commands.
pub trait Dispatch {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Commands that run without loading the config file.
pub enum NoConfigDispatch<'a> {
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> NoConfigDispatch<'a> {
    /// Try to create a dispatch from the CLI command.
    /// Returns None if the command needs the loaded config.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl Dispatch for NoConfigDispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("fq - filter expression inspector");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = commands::config::ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
    }
}

/// Commands that work on filter expressions.
pub enum FilterDispatch<'a> {
    Parse {
        expression: &'a Option<String>,
        canonical: bool,
    },
    Tokens {
        expression: &'a Option<String>,
    },
    Operators,
}

impl<'a> FilterDispatch<'a> {
    /// Creates a dispatch from the CLI command.
    /// Returns None for commands handled by [`NoConfigDispatch`].
    pub fn from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Parse {
                expression,
                canonical,
            }) => Some(Self::Parse {
                expression,
                canonical: *canonical,
            }),
            Some(Commands::Tokens { expression }) => Some(Self::Tokens { expression }),
            Some(Commands::Operators) => Some(Self::Operators),
            _ => None,
        }
    }
}

impl Dispatch for FilterDispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Parse {
                expression,
                canonical,
            } => {
                let opts = commands::parse::ParseOptions {
                    expression: (*expression).clone(),
                    canonical: *canonical,
                };
                commands::parse::execute(ctx, &opts)
            }
            Self::Tokens { expression } => {
                let opts = commands::tokens::TokensOptions {
                    expression: (*expression).clone(),
                };
                commands::tokens::execute(ctx, &opts)
            }
            Self::Operators => commands::operators::execute(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_no_config_dispatch_config_show() {
        let cli = Cli::parse_from(["fq", "config", "show"]);
        let dispatch = NoConfigDispatch::try_from_cli(&cli);
        assert!(matches!(dispatch, Some(NoConfigDispatch::Config(_))));
    }

    #[test]
    fn test_no_config_dispatch_completions() {
        let cli = Cli::parse_from(["fq", "completions", "zsh"]);
        let dispatch = NoConfigDispatch::try_from_cli(&cli);
        assert!(matches!(dispatch, Some(NoConfigDispatch::Completions(_))));
    }

    #[test]
    fn test_no_config_dispatch_help() {
        let cli = Cli::parse_from(["fq"]);
        let dispatch = NoConfigDispatch::try_from_cli(&cli);
        assert!(matches!(dispatch, Some(NoConfigDispatch::Help)));
    }

    #[test]
    fn test_no_config_dispatch_returns_none_for_parse() {
        let cli = Cli::parse_from(["fq", "parse", "a = 1"]);
        assert!(NoConfigDispatch::try_from_cli(&cli).is_none());
    }

    #[test]
    fn test_filter_dispatch_parse() {
        let cli = Cli::parse_from(["fq", "parse", "a = 1", "--canonical"]);
        let dispatch = FilterDispatch::from_cli(&cli);
        assert!(matches!(
            dispatch,
            Some(FilterDispatch::Parse {
                canonical: true,
                ..
            })
        ));
    }

    #[test]
    fn test_filter_dispatch_tokens_and_operators() {
        let cli = Cli::parse_from(["fq", "tokens", "a = 1"]);
        assert!(matches!(
            FilterDispatch::from_cli(&cli),
            Some(FilterDispatch::Tokens { .. })
        ));

        let cli = Cli::parse_from(["fq", "operators"]);
        assert!(matches!(
            FilterDispatch::from_cli(&cli),
            Some(FilterDispatch::Operators)
        ));
    }

    #[test]
    fn test_filter_dispatch_returns_none_for_config() {
        let cli = Cli::parse_from(["fq", "config", "show"]);
        assert!(FilterDispatch::from_cli(&cli).is_none());
    }
}
