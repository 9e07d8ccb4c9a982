//! Recursive descent parser for filter expressions.

use tracing::debug;

use super::ast::{Literal, Node, GEO_FIELD};
use super::catalog::{looks_like_operator, Arity, Connective, Operator};
use super::error::{FilterResult, ParseError, ParseResult};
use super::lexer::{Lexer, Token, TokenKind};

/// Default limit on nested parentheses and `NOT`s.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parser for filter expressions.
///
/// # Grammar
///
/// ```text
/// expr        ::= or_seq
/// or_seq      ::= and_seq ("OR" and_seq)*
/// and_seq     ::= primary ("AND" primary)*
/// primary     ::= "NOT" primary | "(" expr ")" | predicate
/// predicate   ::= field compare_op value
///               | field set_op list
///               | field value "TO" value
///               | field (existence_op | null_op | empty_op)
///               | field string_op value
///               | geo_func "(" numeric_args ")"
/// list        ::= "[" (value ("," value)*)? "]"
/// ```
///
/// # Precedence (highest to lowest)
///
/// 1. `NOT` - applies to the single following primary
/// 2. `AND` - runs are flattened into one node
/// 3. `OR` - runs are flattened into one node
///
/// # Example
///
/// ```
/// use filter_ast_rs::filter::{Connective, FilterParser, Node};
///
/// let tree = FilterParser::parse("a = 1 OR b = 2 AND c = 3").unwrap();
/// match tree {
///     Node::Logical { connective, children } => {
///         assert_eq!(connective, Connective::Or);
///         assert_eq!(children.len(), 2);
///     }
///     _ => panic!("expected an OR node"),
/// }
/// ```
pub struct FilterParser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl Default for FilterParser {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            position: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FilterParser {
    /// Creates a parser with the default nesting limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth of parentheses and `NOT`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses a filter expression string into a syntax tree.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Lex` if the input cannot be tokenized, and
    /// `FilterError::Parse` if the tokens do not form a valid expression.
    pub fn parse(input: &str) -> FilterResult<Node> {
        Self::new().parse_str(input)
    }

    /// Parses a filter expression string using this parser's settings.
    pub fn parse_str(self, input: &str) -> FilterResult<Node> {
        let tokens = Lexer::new(input).tokenize()?;
        debug!(tokens = tokens.len(), "tokenized filter expression");
        Ok(self.build(tokens)?)
    }

    /// Builds a syntax tree from an already tokenized expression.
    ///
    /// # Errors
    ///
    /// Returns the first structural error found in a left-to-right pass.
    pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult<Node> {
        Self::new().build(tokens)
    }

    /// Builds a syntax tree from tokens using this parser's settings.
    pub fn build(mut self, tokens: Vec<Token>) -> ParseResult<Node> {
        if tokens.is_empty() {
            return Err(ParseError::EmptyExpression);
        }
        self.tokens = tokens;
        self.position = 0;
        self.depth = 0;

        let node = self.parse_or_seq()?;

        if let Some(remaining) = self.peek() {
            return Err(match remaining.kind {
                TokenKind::ParenClose => ParseError::UnbalancedParentheses,
                _ => ParseError::unexpected_token(remaining.to_string()),
            });
        }

        debug!(depth = node.depth(), fields = node.fields().len(), "built filter tree");
        Ok(node)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Returns the current token's connective, if it is one.
    fn peek_connective(&self) -> Option<Connective> {
        self.peek().and_then(Token::as_connective)
    }

    /// Describes the current token for error messages.
    fn found(&self) -> String {
        self.peek()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "end of input".to_string())
    }

    /// Checks that a connective just consumed has a right-hand operand.
    fn expect_right_operand(&self, connective: Connective) -> ParseResult<()> {
        let missing = match self.peek() {
            None => true,
            Some(token) => {
                token.kind == TokenKind::ParenClose
                    || matches!(
                        token.as_connective(),
                        Some(Connective::And | Connective::Or)
                    )
            }
        };
        if missing {
            Err(ParseError::dangling(connective.as_str()))
        } else {
            Ok(())
        }
    }

    /// Parses OR sequences: `and_seq ("OR" and_seq)*`
    fn parse_or_seq(&mut self) -> ParseResult<Node> {
        let first = self.parse_and_seq()?;
        let mut children = vec![first];

        while self.peek_connective() == Some(Connective::Or) {
            self.advance();
            self.expect_right_operand(Connective::Or)?;
            children.push(self.parse_and_seq()?);
        }

        Ok(Self::fold(Connective::Or, children))
    }

    /// Parses AND sequences: `primary ("AND" primary)*`
    fn parse_and_seq(&mut self) -> ParseResult<Node> {
        let first = self.parse_primary()?;
        let mut children = vec![first];

        while self.peek_connective() == Some(Connective::And) {
            self.advance();
            self.expect_right_operand(Connective::And)?;
            children.push(self.parse_primary()?);
        }

        Ok(Self::fold(Connective::And, children))
    }

    /// Returns a lone child unwrapped, otherwise one flattened node.
    ///
    /// A parenthesized child group with the same connective is spliced in, so
    /// `(a OR b) OR c` and `a OR b OR c` build the same tree.
    fn fold(connective: Connective, children: Vec<Node>) -> Node {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Node::Logical {
                    connective: inner,
                    children: grandchildren,
                } if inner == connective => flat.extend(grandchildren),
                other => flat.push(other),
            }
        }

        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Node::Logical {
                connective,
                children: flat,
            }
        }
    }

    /// Enters a nesting level, enforcing the depth limit.
    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::TooDeeplyNested {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Parses primaries: `"NOT" primary | "(" expr ")" | predicate`
    fn parse_primary(&mut self) -> ParseResult<Node> {
        let Some(token) = self.peek().cloned() else {
            return Err(ParseError::EmptyExpression);
        };

        match token.kind {
            TokenKind::LogicalConnective => match token.as_connective() {
                Some(Connective::Not) => {
                    self.advance();
                    self.expect_right_operand(Connective::Not)?;
                    self.enter()?;
                    let inner = self.parse_primary()?;
                    self.depth -= 1;
                    Ok(Node::negate(inner))
                }
                // Leading AND/OR: nothing on the left.
                Some(connective) => Err(ParseError::dangling(connective.as_str())),
                None => Err(ParseError::unexpected_token(token.to_string())),
            },
            TokenKind::ParenOpen => {
                self.advance();
                match self.peek().map(|t| t.kind) {
                    None => return Err(ParseError::UnbalancedParentheses),
                    Some(TokenKind::ParenClose) => return Err(ParseError::EmptyExpression),
                    Some(_) => {}
                }
                self.enter()?;
                let inner = self.parse_or_seq()?;
                self.depth -= 1;
                match self.advance() {
                    Some(close) if close.kind == TokenKind::ParenClose => Ok(inner),
                    Some(other) => Err(ParseError::unexpected_token(other.to_string())),
                    None => Err(ParseError::UnbalancedParentheses),
                }
            }
            TokenKind::ParenClose => Err(ParseError::UnbalancedParentheses),
            TokenKind::Field => self.parse_predicate(),
            TokenKind::GeoFunction => self.parse_geo(),
            _ => Err(ParseError::unexpected_token(token.to_string())),
        }
    }

    /// Resolves an operator token against the catalog.
    ///
    /// The token kind must agree with the operator's category.
    fn resolve_operator(token: &Token) -> ParseResult<Operator> {
        Operator::lookup(&token.text)
            .filter(|op| token.kind.operator_category() == Some(op.category()))
            .ok_or_else(|| ParseError::UnknownOperator(token.text.clone()))
    }

    /// Consumes a scalar value token and types it.
    fn expect_value(&mut self, operator: Operator) -> ParseResult<Literal> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Value { quoted },
                text,
            }) => {
                let literal = Literal::from_token_text(text, *quoted);
                self.advance();
                Ok(literal)
            }
            _ => Err(ParseError::operand_mismatch(operator.as_str(), self.found())),
        }
    }

    /// Parses a predicate starting at a field token.
    fn parse_predicate(&mut self) -> ParseResult<Node> {
        let field = match self.advance() {
            Some(token) => token.text,
            None => return Err(ParseError::EmptyExpression),
        };

        let Some(next) = self.peek().cloned() else {
            return Err(ParseError::expected_operator(field));
        };

        match next.kind {
            // field low TO high
            TokenKind::Value { quoted } => {
                let low = self.expect_value(Operator::To)?;
                match self.peek() {
                    Some(token) if token.kind == TokenKind::RangeOperator => {
                        let operator = Self::resolve_operator(token)?;
                        self.advance();
                        let high = self.expect_value(operator)?;
                        Ok(Node::predicate(field, operator, vec![low, high]))
                    }
                    // A misspelled keyword in operator position.
                    _ if !quoted && looks_like_operator(&next.text) => {
                        Err(ParseError::UnknownOperator(next.text))
                    }
                    _ => Err(ParseError::expected_operator(field)),
                }
            }
            TokenKind::RangeOperator => {
                let operator = Self::resolve_operator(&next)?;
                self.advance();
                let found = match self.peek() {
                    Some(token) if matches!(token.kind, TokenKind::Value { .. }) => 1,
                    _ => 0,
                };
                Err(ParseError::ArityMismatch {
                    operator: operator.as_str().to_string(),
                    expected: 2,
                    found,
                })
            }
            TokenKind::CompareOperator | TokenKind::StringOperator => {
                let operator = Self::resolve_operator(&next)?;
                self.advance();
                let value = self.expect_value(operator)?;
                Ok(Node::predicate(field, operator, vec![value]))
            }
            TokenKind::SetOperator => {
                let operator = Self::resolve_operator(&next)?;
                self.advance();
                let operands = self.parse_list(operator)?;
                Ok(Node::predicate(field, operator, operands))
            }
            TokenKind::ExistenceOperator | TokenKind::NullOperator | TokenKind::EmptyOperator => {
                let operator = Self::resolve_operator(&next)?;
                self.advance();
                Ok(Node::predicate(field, operator, Vec::new()))
            }
            _ => Err(ParseError::expected_operator(field)),
        }
    }

    /// Parses a list literal: `"[" (value ("," value)*)? "]"`
    fn parse_list(&mut self, operator: Operator) -> ParseResult<Vec<Literal>> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::ListOpen => {
                self.advance();
            }
            _ => return Err(ParseError::operand_mismatch(operator.as_str(), self.found())),
        }

        let mut items = Vec::new();
        if self.peek().map(|t| t.kind) == Some(TokenKind::ListClose) {
            self.advance();
            return Ok(items);
        }

        loop {
            items.push(self.expect_value(operator)?);
            match self.advance() {
                Some(token) if token.kind == TokenKind::ListSeparator => {}
                Some(token) if token.kind == TokenKind::ListClose => return Ok(items),
                Some(token) => {
                    return Err(ParseError::operand_mismatch(
                        operator.as_str(),
                        token.to_string(),
                    ))
                }
                None => {
                    return Err(ParseError::operand_mismatch(
                        operator.as_str(),
                        "end of input",
                    ))
                }
            }
        }
    }

    /// Parses a geo function call.
    ///
    /// Arguments are numbers separated by commas. Pairs may be wrapped in
    /// brackets (`_geoBoundingBox([1, 2], [3, 4])`); the brackets are
    /// flattened away.
    fn parse_geo(&mut self) -> ParseResult<Node> {
        let operator = match self.advance() {
            Some(token) => Self::resolve_operator(&token)?,
            None => return Err(ParseError::EmptyExpression),
        };

        match self.advance() {
            Some(token) if token.kind == TokenKind::ParenOpen => {}
            Some(token) => {
                return Err(ParseError::operand_mismatch(
                    operator.as_str(),
                    token.to_string(),
                ))
            }
            None => return Err(ParseError::UnbalancedParentheses),
        }

        let mut args = Vec::new();
        let mut in_pair = false;
        let mut expect_arg = true;
        loop {
            let Some(token) = self.advance() else {
                return Err(ParseError::UnbalancedParentheses);
            };
            match token.kind {
                TokenKind::ParenClose if !in_pair && (!expect_arg || args.is_empty()) => break,
                TokenKind::ListOpen if expect_arg && !in_pair => in_pair = true,
                TokenKind::ListClose if in_pair && !expect_arg => in_pair = false,
                TokenKind::ListSeparator if !expect_arg => expect_arg = true,
                TokenKind::Value { quoted } if expect_arg => {
                    match Literal::from_token_text(&token.text, quoted) {
                        number @ Literal::Number(_) => args.push(number),
                        _ => {
                            return Err(ParseError::operand_mismatch(
                                operator.as_str(),
                                token.to_string(),
                            ))
                        }
                    }
                    expect_arg = false;
                }
                _ => {
                    return Err(ParseError::operand_mismatch(
                        operator.as_str(),
                        token.to_string(),
                    ))
                }
            }
        }

        if let Arity::Exactly(expected) = operator.arity() {
            if args.len() != expected {
                return Err(ParseError::ArityMismatch {
                    operator: operator.as_str().to_string(),
                    expected,
                    found: args.len(),
                });
            }
        }

        Ok(Node::predicate(GEO_FIELD, operator, args))
    }
}
