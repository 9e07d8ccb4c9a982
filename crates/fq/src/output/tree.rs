//! Syntax tree output formatting.

use filter_ast_rs::filter::Node;
use owo_colors::OwoColorize;
use serde::Serialize;

/// JSON output structure for the parse command.
#[derive(Serialize)]
pub struct ParseOutput<'a> {
    pub canonical: String,
    pub depth: usize,
    pub fields: Vec<&'a str>,
    pub tree: &'a Node,
}

/// Formats a syntax tree as JSON.
pub fn format_tree_json(tree: &Node) -> Result<String, serde_json::Error> {
    let output = ParseOutput {
        canonical: tree.to_string(),
        depth: tree.depth(),
        fields: tree.fields(),
        tree,
    };

    serde_json::to_string_pretty(&output)
}

/// Formats a syntax tree with one node per line, children indented.
pub fn format_tree(tree: &Node, use_colors: bool) -> String {
    fn print_node(output: &mut String, node: &Node, depth: usize, use_colors: bool) {
        let indent = "  ".repeat(depth);
        let prefix = if depth > 0 { "└─ " } else { "" };

        match node {
            Node::Predicate { .. } => {
                output.push_str(&format!("{}{}{}\n", indent, prefix, node));
            }
            Node::Logical {
                connective,
                children,
            } => {
                let label = if use_colors {
                    connective.as_str().cyan().bold().to_string()
                } else {
                    connective.as_str().to_string()
                };
                output.push_str(&format!("{}{}{}\n", indent, prefix, label));

                for child in children {
                    print_node(output, child, depth + 1, use_colors);
                }
            }
        }
    }

    let mut output = String::new();
    print_node(&mut output, tree, 0, use_colors);
    output
}
