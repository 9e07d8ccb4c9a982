//! Error types for the tokenizer and the parser.

use thiserror::Error;

use super::catalog::suggest_operator;

/// A specialized Result type for tokenizing.
pub type LexResult<T> = Result<T, LexError>;

/// A specialized Result type for building a syntax tree from tokens.
pub type ParseResult<T> = Result<T, ParseError>;

/// A specialized Result type for parsing a filter string end to end.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while tokenizing a filter expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    /// A quoted literal was still open at the end of the input.
    #[error("unterminated string literal: {text}")]
    UnterminatedString {
        /// The text collected before the input ran out.
        text: String,
    },

    /// Text in operator position that is not a known operator.
    #[error("invalid operator: {0}")]
    InvalidOperator(String),

    /// The input ended where an operand was still required.
    #[error("unexpected end of expression after {after}")]
    UnexpectedEOF {
        /// The last token text before the input ended.
        after: String,
    },

    /// A list literal was never closed, or a `]` had no matching `[`.
    #[error("unbalanced list brackets")]
    UnbalancedListBrackets,

    /// A character that cannot appear at this position.
    #[error("unexpected character: {0}")]
    UnexpectedCharacter(char),
}

impl LexError {
    /// Creates an invalid operator error.
    pub fn invalid_operator(text: impl Into<String>) -> Self {
        LexError::InvalidOperator(text.into())
    }

    /// Returns the closest catalog operator for an invalid operator, if any.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            LexError::InvalidOperator(text) => suggest_operator(text),
            _ => None,
        }
    }
}

/// Errors that can occur while building the syntax tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The filter expression is empty.
    #[error("filter expression is empty")]
    EmptyExpression,

    /// A `(` without a matching `)`, or the reverse.
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    /// A connective with a missing left or right operand.
    #[error("connective {connective} is missing an operand")]
    DanglingConnective {
        /// The connective keyword.
        connective: String,
    },

    /// A field that is not followed by an operator.
    #[error("expected an operator after field {field}")]
    ExpectedOperator {
        /// The field name.
        field: String,
    },

    /// An operand whose shape does not fit the operator.
    #[error("operator {operator} cannot take {found} as operand")]
    OperandMismatch {
        /// The operator text.
        operator: String,
        /// The offending token text.
        found: String,
    },

    /// A fixed-arity operator received the wrong number of operands.
    #[error("operator {operator} expects {expected} operands, found {found}")]
    ArityMismatch {
        /// The operator text.
        operator: String,
        /// The arity declared by the catalog.
        expected: usize,
        /// The number of operands supplied.
        found: usize,
    },

    /// An operator token that is not in the catalog.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// A token that cannot appear at this position.
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    /// Parentheses or `NOT` nested deeper than the configured limit.
    #[error("expression nested deeper than {limit} levels")]
    TooDeeplyNested {
        /// The nesting limit that was exceeded.
        limit: usize,
    },
}

impl ParseError {
    /// Creates a dangling connective error.
    pub fn dangling(connective: impl Into<String>) -> Self {
        ParseError::DanglingConnective {
            connective: connective.into(),
        }
    }

    /// Creates an expected operator error.
    pub fn expected_operator(field: impl Into<String>) -> Self {
        ParseError::ExpectedOperator {
            field: field.into(),
        }
    }

    /// Creates an operand mismatch error.
    pub fn operand_mismatch(operator: impl Into<String>, found: impl Into<String>) -> Self {
        ParseError::OperandMismatch {
            operator: operator.into(),
            found: found.into(),
        }
    }

    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>) -> Self {
        ParseError::UnexpectedToken(token.into())
    }
}

/// Any error produced while turning filter text into a syntax tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// Tokenizing failed; the parser never ran.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Tokenizing succeeded but the tokens do not form a valid expression.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl FilterError {
    /// Returns a "did you mean" operator suggestion, if one applies.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            FilterError::Lex(e) => e.suggestion(),
            FilterError::Parse(ParseError::UnknownOperator(text)) => suggest_operator(text),
            FilterError::Parse(_) => None,
        }
    }
}
