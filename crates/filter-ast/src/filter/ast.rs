//! Abstract Syntax Tree (AST) for filter expressions.

use std::fmt;

use serde::Serialize;

use super::catalog::{is_comparison_start, Connective, Operator, OperatorCategory};

/// Field name recorded on geo predicates, which have no field of their own.
pub const GEO_FIELD: &str = "_geo";

/// A literal operand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    String(String),
    Number(f64),
    Bool(bool),
}

impl Literal {
    /// Types the text of a value token.
    ///
    /// Quoted text is always a string. Unquoted `true`/`false` are booleans
    /// and unquoted finite decimals are numbers; anything else is a string.
    pub fn from_token_text(text: &str, quoted: bool) -> Self {
        if quoted {
            return Literal::String(text.to_string());
        }
        match text {
            "true" => Literal::Bool(true),
            "false" => Literal::Bool(false),
            _ => match parse_number(text) {
                Some(n) => Literal::Number(n),
                None => Literal::String(text.to_string()),
            },
        }
    }

    /// Returns the number, if this is a numeric literal.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Parses a plain decimal; rejects `inf`, `NaN` and anything non-finite.
fn parse_number(text: &str) -> Option<f64> {
    let numeric_chars = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !numeric_chars || !text.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write_quoted(f, s),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

/// A node of a parsed filter expression.
///
/// Parentheses never appear in the tree; grouping is expressed by nesting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// A single field/operator/operands test.
    Predicate {
        field: String,
        operator: Operator,
        operands: Vec<Literal>,
    },

    /// A boolean composition. `NOT` has exactly one child, `AND` and `OR`
    /// two or more.
    Logical {
        connective: Connective,
        children: Vec<Node>,
    },
}

impl Node {
    /// Creates a predicate node.
    ///
    /// # Example
    ///
    /// ```
    /// use filter_ast_rs::filter::{Literal, Node, Operator};
    ///
    /// let node = Node::predicate("rating", Operator::GreaterThan, vec![Literal::Number(3.0)]);
    /// assert_eq!(node.to_string(), "rating > 3");
    /// ```
    pub fn predicate(field: impl Into<String>, operator: Operator, operands: Vec<Literal>) -> Self {
        Node::Predicate {
            field: field.into(),
            operator,
            operands,
        }
    }

    /// Creates an AND node over the given children.
    pub fn and(children: Vec<Node>) -> Self {
        Node::Logical {
            connective: Connective::And,
            children,
        }
    }

    /// Creates an OR node over the given children.
    pub fn or(children: Vec<Node>) -> Self {
        Node::Logical {
            connective: Connective::Or,
            children,
        }
    }

    /// Creates a NOT node.
    pub fn negate(inner: Node) -> Self {
        Node::Logical {
            connective: Connective::Not,
            children: vec![inner],
        }
    }

    /// Returns the field names of all predicates, left to right.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Predicate { field, .. } => out.push(field),
            Node::Logical { children, .. } => {
                for child in children {
                    child.collect_fields(out);
                }
            }
        }
    }

    /// Returns the number of levels in the tree; a lone predicate has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Node::Predicate { .. } => 1,
            Node::Logical { children, .. } => {
                1 + children.iter().map(Node::depth).max().unwrap_or(0)
            }
        }
    }

    fn connective(&self) -> Option<Connective> {
        match self {
            Node::Logical { connective, .. } => Some(*connective),
            Node::Predicate { .. } => None,
        }
    }
}

/// Returns true if a field name has to be quoted to lex back as one field.
fn needs_quotes(field: &str) -> bool {
    field.is_empty()
        || Connective::lookup(field).is_some()
        || field
            .chars()
            .any(|c| c.is_whitespace() || is_comparison_start(c) || "()[],\"'\\".contains(c))
}

fn write_list(f: &mut fmt::Formatter<'_>, operands: &[Literal]) -> fmt::Result {
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{operand}")?;
    }
    Ok(())
}

/// Renders the canonical filter string; parsing it yields the same tree.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Predicate {
                field,
                operator,
                operands,
            } => {
                if operator.category() == OperatorCategory::Geo {
                    write!(f, "{operator}(")?;
                    write_list(f, operands)?;
                    return f.write_str(")");
                }

                if needs_quotes(field) {
                    write_quoted(f, field)?;
                } else {
                    f.write_str(field)?;
                }

                match (operator.category(), operands.as_slice()) {
                    (OperatorCategory::Range, [low, high]) => {
                        write!(f, " {low} {operator} {high}")
                    }
                    (OperatorCategory::Set, _) => {
                        write!(f, " {operator} [")?;
                        write_list(f, operands)?;
                        f.write_str("]")
                    }
                    _ => {
                        write!(f, " {operator}")?;
                        for operand in operands {
                            write!(f, " {operand}")?;
                        }
                        Ok(())
                    }
                }
            }
            Node::Logical {
                connective,
                children,
            } => {
                if *connective == Connective::Not {
                    f.write_str("NOT ")?;
                    for child in children {
                        match child.connective() {
                            Some(Connective::And | Connective::Or) => write!(f, "({child})")?,
                            _ => write!(f, "{child}")?,
                        }
                    }
                    return Ok(());
                }

                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {connective} ")?;
                    }
                    // An AND inside an OR is grouped by precedence; every
                    // other nested AND/OR came from explicit parentheses.
                    let grouped = match (connective, child.connective()) {
                        (Connective::Or, Some(Connective::And)) => false,
                        (_, Some(Connective::And | Connective::Or)) => true,
                        _ => false,
                    };
                    if grouped {
                        write!(f, "({child})")?;
                    } else {
                        write!(f, "{child}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_typing() {
        assert_eq!(Literal::from_token_text("3", false), Literal::Number(3.0));
        assert_eq!(Literal::from_token_text("-2.5", false), Literal::Number(-2.5));
        assert_eq!(Literal::from_token_text("1e3", false), Literal::Number(1000.0));
        assert_eq!(Literal::from_token_text("true", false), Literal::Bool(true));
        assert_eq!(Literal::from_token_text("false", false), Literal::Bool(false));
        assert_eq!(Literal::from_token_text("drama", false), Literal::from("drama"));
        assert_eq!(Literal::from_token_text("3", true), Literal::from("3"));
        assert_eq!(Literal::from_token_text("true", true), Literal::from("true"));
    }

    #[test]
    fn test_literal_typing_rejects_non_finite_words() {
        assert_eq!(Literal::from_token_text("inf", false), Literal::from("inf"));
        assert_eq!(Literal::from_token_text("NaN", false), Literal::from("NaN"));
        assert_eq!(Literal::from_token_text("1e400", false), Literal::from("1e400"));
        assert_eq!(Literal::from_token_text("-", false), Literal::from("-"));
        assert_eq!(
            Literal::from_token_text("2020-01-01", false),
            Literal::from("2020-01-01")
        );
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Number(3.0).to_string(), "3");
        assert_eq!(Literal::Number(48.85).to_string(), "48.85");
        assert_eq!(Literal::from(r#"a "b" \c"#).to_string(), r#""a \"b\" \\c""#);
    }

    #[test]
    fn test_node_display() {
        let node = Node::or(vec![
            Node::predicate("a", Operator::Equal, vec![1.0.into()]),
            Node::and(vec![
                Node::predicate("b", Operator::Exists, vec![]),
                Node::negate(Node::predicate("c", Operator::In, vec!["x".into(), "y".into()])),
            ]),
        ]);
        assert_eq!(node.to_string(), r#"a = 1 OR b EXISTS AND NOT c IN ["x", "y"]"#);
    }

    #[test]
    fn test_node_display_groups() {
        let node = Node::and(vec![
            Node::or(vec![
                Node::predicate("a", Operator::IsNull, vec![]),
                Node::predicate("b", Operator::IsEmpty, vec![]),
            ]),
            Node::negate(Node::and(vec![
                Node::predicate("c", Operator::To, vec![1.0.into(), 2.0.into()]),
                Node::predicate(GEO_FIELD, Operator::GeoRadius, vec![1.0.into(), 2.0.into(), 3.0.into()]),
            ])),
        ]);
        assert_eq!(
            node.to_string(),
            "(a IS NULL OR b IS EMPTY) AND NOT (c 1 TO 2 AND _geoRadius(1, 2, 3))"
        );
    }

    #[test]
    fn test_node_display_quotes_awkward_fields() {
        let node = Node::predicate("release year", Operator::Equal, vec![true.into()]);
        assert_eq!(node.to_string(), r#""release year" = true"#);

        let node = Node::predicate("AND", Operator::Exists, vec![]);
        assert_eq!(node.to_string(), r#""AND" EXISTS"#);
    }

    #[test]
    fn test_fields_and_depth() {
        let node = Node::and(vec![
            Node::predicate("a", Operator::Exists, vec![]),
            Node::negate(Node::predicate("b", Operator::Exists, vec![])),
        ]);
        assert_eq!(node.fields(), vec!["a", "b"]);
        assert_eq!(node.depth(), 3);
    }
}
