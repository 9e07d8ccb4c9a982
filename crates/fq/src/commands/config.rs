//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/fq/config.toml.

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Parser settings.
    #[serde(default)]
    pub parser: ParserConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            output: OutputConfig::default(),
            parser: ParserConfig::default(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,

    /// Default output format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

/// Output formats for parse results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Tree,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tree => write!(f, "tree"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parser configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Maximum nesting depth of parentheses and NOT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/fq/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("fq"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("fq"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    // Check for override env var first
    if let Ok(path) = env::var("FQ_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    debug!(path = %path.display(), version = config.version, "loaded config");
    migrate_config(config)
}

/// Migrates config to current version if needed.
/// Fails for files written by a newer fq, whose keys this build may misread.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "Config version {} is newer than supported version {}. Upgrade fq",
            config.version, CONFIG_VERSION
        )));
    }

    // Version 1 is the initial schema; older files only need the stamp.
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Saves the configuration to disk.
fn save_config(config: &Config) -> Result<()> {
    let path = get_config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| CommandError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&path, content)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if path.exists() {
            println!("[output]");
            if let Some(color) = config.output.color {
                println!("  color: {}", color);
            }
            if let Some(format) = config.output.format {
                println!("  format: {}", format);
            }

            println!("\n[parser]");
            if let Some(max_depth) = config.parser.max_depth {
                println!("  max_depth: {}", max_depth);
            }
        } else {
            println!("(No config file exists. Run 'fq config set <key> <value>' to create one.)");
        }
    }

    Ok(())
}

/// Options for the config set command.
pub struct ConfigSetOptions {
    /// Configuration key.
    pub key: String,
    /// Configuration value.
    pub value: String,
}

/// Applies one `section.field = value` assignment to a config.
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let (section, field) = match key.split_once('.') {
        Some((section, field)) => (Some(section), field),
        None => (None, key),
    };

    match (section, field) {
        (Some("output"), "color") => {
            config.output.color = Some(parse_bool(value)?);
        }
        (Some("output"), "format") => {
            let format = match value {
                "tree" => OutputFormat::Tree,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(CommandError::Config(format!(
                        "Invalid format value '{}'. Valid values: tree, json",
                        value
                    )))
                }
            };
            config.output.format = Some(format);
        }
        (Some("parser"), "max_depth") => {
            let depth = value
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| {
                    CommandError::Config(format!(
                        "Invalid max_depth value '{}'. Use a positive integer",
                        value
                    ))
                })?;
            config.parser.max_depth = Some(depth);
        }
        _ => {
            return Err(CommandError::Config(format!(
                "Unknown config key '{}'. Valid keys: output.color, output.format, parser.max_depth",
                key
            )));
        }
    }

    Ok(())
}

/// Executes the config set command.
pub fn execute_set(ctx: &CommandContext, opts: &ConfigSetOptions) -> Result<()> {
    let mut config = load_config()?;
    let path = get_config_path()?;

    apply_setting(&mut config, &opts.key, &opts.value)?;
    save_config(&config)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "key": opts.key,
            "value": opts.value,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Set {} = {}", opts.key, opts.value);
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Parses a boolean value from string.
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CommandError::Config(format!(
            "Invalid boolean value '{}'. Use true/false, yes/no, 1/0, or on/off",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    /// Points FQ_CONFIG at a file in a fresh temp dir for the duration of `f`.
    fn with_config_path<F: FnOnce(&std::path::Path)>(f: F) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let original = env::var("FQ_CONFIG").ok();
        env::set_var("FQ_CONFIG", &config_path);

        f(&config_path);

        match original {
            Some(val) => env::set_var("FQ_CONFIG", val),
            None => env::remove_var("FQ_CONFIG"),
        }
    }

    #[test]
    fn test_parse_bool_true_values() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("True").unwrap());
        assert!(parse_bool("yes").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(parse_bool("on").unwrap());
    }

    #[test]
    fn test_parse_bool_false_values() {
        assert!(!parse_bool("false").unwrap());
        assert!(!parse_bool("FALSE").unwrap());
        assert!(!parse_bool("no").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(!parse_bool("off").unwrap());
    }

    #[test]
    fn test_parse_bool_invalid() {
        assert!(parse_bool("maybe").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.output.color.is_none());
        assert!(config.output.format.is_none());
        assert!(config.parser.max_depth.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            version: CONFIG_VERSION,
            output: OutputConfig {
                color: Some(true),
                format: Some(OutputFormat::Json),
            },
            parser: ParserConfig {
                max_depth: Some(64),
            },
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("version = 1"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("color = true"));
        assert!(toml_str.contains(r#"format = "json""#));
        assert!(toml_str.contains("[parser]"));
        assert!(toml_str.contains("max_depth = 64"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
version = 1

[output]
color = false
format = "tree"

[parser]
max_depth = 32
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.output.color, Some(false));
        assert_eq!(config.output.format, Some(OutputFormat::Tree));
        assert_eq!(config.parser.max_depth, Some(32));
    }

    #[test]
    fn test_config_deserialization_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_config_rejects_unknown_format() {
        let toml_str = r#"
[output]
format = "yaml"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_migrate_config_preserves_data() {
        let config = Config {
            version: 0,
            output: OutputConfig {
                color: Some(true),
                format: None,
            },
            parser: ParserConfig {
                max_depth: Some(10),
            },
        };

        let migrated = migrate_config(config).unwrap();
        assert_eq!(migrated.version, CONFIG_VERSION);
        assert_eq!(migrated.output.color, Some(true));
        assert_eq!(migrated.parser.max_depth, Some(10));
    }

    #[test]
    fn test_migrate_config_rejects_newer_version() {
        let config = Config {
            version: CONFIG_VERSION + 1,
            ..Config::default()
        };

        let err = migrate_config(config).unwrap_err();
        assert!(matches!(err, CommandError::Config(msg) if msg.contains("newer than supported")));
    }

    #[test]
    #[serial]
    fn test_load_config_rejects_newer_version() {
        with_config_path(|path| {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, format!("version = {}\n", CONFIG_VERSION + 1)).unwrap();

            assert!(matches!(load_config(), Err(CommandError::Config(_))));
        });
    }

    #[test]
    fn test_apply_setting() {
        let mut config = Config::default();
        apply_setting(&mut config, "output.color", "off").unwrap();
        apply_setting(&mut config, "output.format", "json").unwrap();
        apply_setting(&mut config, "parser.max_depth", "12").unwrap();

        assert_eq!(config.output.color, Some(false));
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert_eq!(config.parser.max_depth, Some(12));
    }

    #[test]
    fn test_apply_setting_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply_setting(&mut config, "output.format", "yaml").is_err());
        assert!(apply_setting(&mut config, "parser.max_depth", "0").is_err());
        assert!(apply_setting(&mut config, "parser.max_depth", "-3").is_err());
        assert!(apply_setting(&mut config, "color", "true").is_err());
        assert!(apply_setting(&mut config, "parser.depth", "3").is_err());
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        with_config_path(|path| {
            assert_eq!(get_config_path().unwrap(), path);
        });
    }

    #[test]
    #[serial]
    fn test_load_missing_config_uses_defaults() {
        with_config_path(|_| {
            let config = load_config().unwrap();
            assert_eq!(config.version, CONFIG_VERSION);
            assert!(config.parser.max_depth.is_none());
        });
    }

    #[test]
    #[serial]
    fn test_save_and_load_round_trip() {
        with_config_path(|path| {
            let mut config = Config::default();
            apply_setting(&mut config, "parser.max_depth", "7").unwrap();
            save_config(&config).unwrap();
            assert!(path.exists());

            let loaded = load_config().unwrap();
            assert_eq!(loaded.parser.max_depth, Some(7));
        });
    }

    #[test]
    #[serial]
    fn test_load_invalid_config() {
        with_config_path(|path| {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "version = [").unwrap();
            assert!(matches!(load_config(), Err(CommandError::Config(_))));
        });
    }
}
