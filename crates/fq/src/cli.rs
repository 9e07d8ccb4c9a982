//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the fq CLI.

use clap::{Parser, Subcommand, ValueEnum};

/// fq - inspect search filter expressions
#[derive(Parser, Debug)]
#[command(name = "fq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Maximum nesting depth of parentheses and NOT (default: from config, else 128)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: Option<u32>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a filter expression and print its syntax tree
    #[command(alias = "p")]
    Parse {
        /// Filter expression (reads stdin when omitted or "-")
        expression: Option<String>,

        /// Print the canonical filter string instead of the tree
        #[arg(long)]
        canonical: bool,
    },

    /// Print the tokens of a filter expression
    #[command(alias = "t")]
    Tokens {
        /// Filter expression (reads stdin when omitted or "-")
        expression: Option<String>,
    },

    /// List supported operators and connectives
    #[command(alias = "ops")]
    Operators,

    /// View and edit configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["fq", "--verbose", "operators"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert!(!cli.json);

        let cli = Cli::parse_from(["fq", "--quiet", "--json", "operators"]);
        assert!(!cli.verbose);
        assert!(cli.quiet);
        assert!(cli.json);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["fq", "-v", "-q", "operators"]).is_err());
    }

    #[test]
    fn test_no_color_flag() {
        let cli = Cli::parse_from(["fq", "--no-color", "operators"]);
        assert!(cli.no_color);
    }

    #[test]
    fn test_max_depth_flag() {
        let cli = Cli::parse_from(["fq", "parse", "a = 1", "--max-depth", "8"]);
        assert_eq!(cli.max_depth, Some(8));

        assert!(Cli::try_parse_from(["fq", "--max-depth", "0", "operators"]).is_err());
        assert!(Cli::try_parse_from(["fq", "--max-depth", "deep", "operators"]).is_err());
    }

    #[test]
    fn test_parse_command() {
        let cli = Cli::parse_from(["fq", "parse", "rating >= 3", "--canonical"]);
        if let Some(Commands::Parse {
            expression,
            canonical,
        }) = cli.command
        {
            assert_eq!(expression, Some("rating >= 3".to_string()));
            assert!(canonical);
        } else {
            panic!("Expected Parse command");
        }
    }

    #[test]
    fn test_parse_without_expression() {
        let cli = Cli::parse_from(["fq", "parse"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Parse {
                expression: None,
                canonical: false
            })
        ));
    }

    #[test]
    fn test_aliases() {
        let cli = Cli::parse_from(["fq", "p", "a EXISTS"]);
        assert!(matches!(cli.command, Some(Commands::Parse { .. })));

        let cli = Cli::parse_from(["fq", "t", "a EXISTS"]);
        assert!(matches!(cli.command, Some(Commands::Tokens { .. })));

        let cli = Cli::parse_from(["fq", "ops"]);
        assert!(matches!(cli.command, Some(Commands::Operators)));
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::parse_from(["fq", "config", "set", "output.format", "json"]);
        if let Some(Commands::Config {
            command: Some(ConfigCommands::Set { key, value }),
        }) = cli.command
        {
            assert_eq!(key, "output.format");
            assert_eq!(value, "json");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn test_completions() {
        let cli = Cli::parse_from(["fq", "completions", "zsh"]);
        if let Some(Commands::Completions { shell }) = cli.command {
            assert!(matches!(shell, Shell::Zsh));
        } else {
            panic!("Expected Completions command");
        }
    }
}
