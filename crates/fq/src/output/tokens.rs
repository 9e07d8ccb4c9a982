//! Token stream output formatting.

use filter_ast_rs::filter::Token;
use owo_colors::OwoColorize;
use serde::Serialize;

/// JSON output structure for the tokens command.
#[derive(Serialize)]
pub struct TokensOutput<'a> {
    pub tokens: Vec<TokenOutput<'a>>,
}

/// JSON output structure for a single token.
#[derive(Serialize)]
pub struct TokenOutput<'a> {
    pub kind: &'static str,
    pub text: &'a str,
}

/// Formats tokens as JSON.
pub fn format_tokens_json(tokens: &[Token]) -> Result<String, serde_json::Error> {
    let output = TokensOutput {
        tokens: tokens
            .iter()
            .map(|t| TokenOutput {
                kind: t.kind.name(),
                text: &t.text,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats tokens as a two-column table.
pub fn format_tokens_table(tokens: &[Token], use_colors: bool) -> String {
    if tokens.is_empty() {
        return "No tokens.\n".to_string();
    }

    let mut output = String::new();

    let header = format!("{:<14} {}", "Kind", "Text");
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for token in tokens {
        let kind = format!("{:<14}", token.kind.name());
        let kind = if use_colors {
            kind.blue().to_string()
        } else {
            kind
        };
        output.push_str(&format!("{} {}\n", kind, token));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use filter_ast_rs::filter::tokenize;

    #[test]
    fn test_format_tokens_table() {
        let tokens = tokenize(r#"a = "x""#).unwrap();
        let table = format_tokens_table(&tokens, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Kind           Text");
        assert_eq!(lines[1], "field          a");
        assert_eq!(lines[2], "compare-op     =");
        assert_eq!(lines[3], r#"string         "x""#);
    }

    #[test]
    fn test_format_empty_tokens() {
        assert_eq!(format_tokens_table(&[], false), "No tokens.\n");
    }

    #[test]
    fn test_format_tokens_json() {
        let tokens = tokenize("tags IS EMPTY").unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&format_tokens_json(&tokens).unwrap()).unwrap();
        assert_eq!(
            json["tokens"],
            serde_json::json!([
                {"kind": "field", "text": "tags"},
                {"kind": "empty-op", "text": "IS EMPTY"}
            ])
        );
    }
}
