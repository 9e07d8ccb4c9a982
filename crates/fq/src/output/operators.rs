//! Operator catalog output formatting.

use filter_ast_rs::filter::{Connective, Operator, OperatorCategory};
use owo_colors::OwoColorize;
use serde::Serialize;

/// JSON output structure for the operators command.
#[derive(Serialize)]
pub struct OperatorsOutput {
    pub operators: Vec<OperatorOutput>,
    pub connectives: Vec<Connective>,
}

/// JSON output structure for a single operator.
#[derive(Serialize)]
pub struct OperatorOutput {
    pub operator: Operator,
    pub category: OperatorCategory,
    pub arity: String,
}

/// Formats the operator catalog as JSON.
pub fn format_operators_json() -> Result<String, serde_json::Error> {
    let output = OperatorsOutput {
        operators: Operator::ALL
            .iter()
            .map(|&op| OperatorOutput {
                operator: op,
                category: op.category(),
                arity: op.arity().to_string(),
            })
            .collect(),
        connectives: Connective::ALL.to_vec(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats the operator catalog as a table.
pub fn format_operators_table(use_colors: bool) -> String {
    let mut output = String::new();

    let header = format!("{:<16} {:<11} {}", "Operator", "Category", "Arity");
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for op in Operator::ALL {
        let name = format!("{:<16}", op.as_str());
        let name = if use_colors {
            name.yellow().to_string()
        } else {
            name
        };
        output.push_str(&format!("{} {:<11} {}\n", name, op.category().as_str(), op.arity()));
    }

    let connectives: Vec<&str> = Connective::ALL.iter().map(|c| c.as_str()).collect();
    output.push_str(&format!("\nConnectives: {}\n", connectives.join(", ")));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_operators_table() {
        let table = format_operators_table(false);
        assert!(table.starts_with("Operator         Category    Arity\n"));
        assert!(table.contains("NOT STARTS WITH  string      1\n"));
        assert!(table.contains("_geoBoundingBox  geo         4\n"));
        assert!(table.contains("IN               set         list\n"));
        assert!(table.ends_with("Connectives: AND, OR, NOT\n"));
    }

    #[test]
    fn test_format_operators_json() {
        let json: serde_json::Value =
            serde_json::from_str(&format_operators_json().unwrap()).unwrap();
        assert_eq!(json["operators"].as_array().unwrap().len(), 21);
        assert_eq!(
            json["operators"][0],
            serde_json::json!({"operator": "=", "category": "comparison", "arity": "1"})
        );
        assert_eq!(json["connectives"], serde_json::json!(["AND", "OR", "NOT"]));
    }
}
