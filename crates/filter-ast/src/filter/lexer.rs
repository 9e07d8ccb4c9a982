//! Lexer (tokenizer) for filter expressions.
//!
//! The lexer is a small state machine. Which tokens are recognized depends on
//! where in a predicate the scan currently is: connectives are only matched
//! between predicates, operators only after a field, and bare words after an
//! operator are always values.

use tracing::trace;

use super::catalog::{
    is_comparison_operator, is_comparison_start, keyword_operators, longest_comparison_operator,
    longest_connective, Connective, Operator, OperatorCategory,
};
use super::error::{LexError, LexResult};

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A field name.
    Field,
    /// A scalar literal. `quoted` is true when it was written in quotes.
    Value { quoted: bool },
    /// `[` opening a list literal (or a bounding-box pair).
    ListOpen,
    /// `]` closing a list literal.
    ListClose,
    /// `,` between list items or function arguments.
    ListSeparator,
    /// `=`, `!=`, `>=`, `>`, `<=`, `<`
    CompareOperator,
    /// `IN`, `NOT IN`
    SetOperator,
    /// `TO`
    RangeOperator,
    /// `EXISTS`, `NOT EXISTS`
    ExistenceOperator,
    /// `IS NULL`, `IS NOT NULL`
    NullOperator,
    /// `IS EMPTY`, `IS NOT EMPTY`
    EmptyOperator,
    /// `CONTAINS`, `NOT CONTAINS`, `STARTS WITH`, `NOT STARTS WITH`
    StringOperator,
    /// `_geoRadius` or `_geoBoundingBox`, always followed by `(`.
    GeoFunction,
    /// `AND`, `OR`, `NOT`
    LogicalConnective,
    /// `(`
    ParenOpen,
    /// `)`
    ParenClose,
}

impl TokenKind {
    /// Returns the token kind that carries operators of the given category.
    pub fn for_category(category: OperatorCategory) -> Self {
        match category {
            OperatorCategory::Comparison => TokenKind::CompareOperator,
            OperatorCategory::Set => TokenKind::SetOperator,
            OperatorCategory::Range => TokenKind::RangeOperator,
            OperatorCategory::Existence => TokenKind::ExistenceOperator,
            OperatorCategory::Null => TokenKind::NullOperator,
            OperatorCategory::Empty => TokenKind::EmptyOperator,
            OperatorCategory::String => TokenKind::StringOperator,
            OperatorCategory::Geo => TokenKind::GeoFunction,
        }
    }

    /// Returns the operator category for operator kinds, `None` otherwise.
    pub fn operator_category(self) -> Option<OperatorCategory> {
        match self {
            TokenKind::CompareOperator => Some(OperatorCategory::Comparison),
            TokenKind::SetOperator => Some(OperatorCategory::Set),
            TokenKind::RangeOperator => Some(OperatorCategory::Range),
            TokenKind::ExistenceOperator => Some(OperatorCategory::Existence),
            TokenKind::NullOperator => Some(OperatorCategory::Null),
            TokenKind::EmptyOperator => Some(OperatorCategory::Empty),
            TokenKind::StringOperator => Some(OperatorCategory::String),
            TokenKind::GeoFunction => Some(OperatorCategory::Geo),
            _ => None,
        }
    }

    /// Returns a short display name for the kind.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Field => "field",
            TokenKind::Value { quoted: true } => "string",
            TokenKind::Value { quoted: false } => "value",
            TokenKind::ListOpen => "list-open",
            TokenKind::ListClose => "list-close",
            TokenKind::ListSeparator => "separator",
            TokenKind::CompareOperator => "compare-op",
            TokenKind::SetOperator => "set-op",
            TokenKind::RangeOperator => "range-op",
            TokenKind::ExistenceOperator => "existence-op",
            TokenKind::NullOperator => "null-op",
            TokenKind::EmptyOperator => "empty-op",
            TokenKind::StringOperator => "string-op",
            TokenKind::GeoFunction => "geo-function",
            TokenKind::LogicalConnective => "connective",
            TokenKind::ParenOpen => "paren-open",
            TokenKind::ParenClose => "paren-close",
        }
    }
}

/// A token in a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What the token is.
    pub kind: TokenKind,
    /// The token text, with quotes and escapes already resolved.
    pub text: String,
}

impl Token {
    /// Creates a token of any kind.
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Creates a field token.
    pub fn field(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Field, text)
    }

    /// Creates an unquoted value token.
    pub fn value(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Value { quoted: false }, text)
    }

    /// Creates a quoted value token.
    pub fn quoted(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Value { quoted: true }, text)
    }

    /// Creates an operator token of the kind matching the operator's category.
    pub fn operator(op: Operator) -> Self {
        Self::new(TokenKind::for_category(op.category()), op.as_str())
    }

    /// Creates a connective token.
    pub fn connective(connective: Connective) -> Self {
        Self::new(TokenKind::LogicalConnective, connective.as_str())
    }

    /// Returns the connective if this is a connective token.
    pub fn as_connective(&self) -> Option<Connective> {
        match self.kind {
            TokenKind::LogicalConnective => Connective::lookup(&self.text),
            _ => None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Value { quoted: true } => write!(f, "{:?}", self.text),
            _ => f.write_str(&self.text),
        }
    }
}

/// Where a quoted literal came from, which decides the token it becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    Field,
    RangeBound,
    Operand,
    ListItem,
    GeoArgument,
}

/// Lexer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    /// Between predicates: expecting a field, a connective or a parenthesis.
    Default,
    /// Inside a quoted literal.
    InQuotedLiteral { quote: char, resume: Resume },
    /// Inside `[...]`.
    InList,
    /// Just read a field; scanning for an operator.
    ExpectingOperator,
    /// Just read an operator; scanning for a value or list.
    ExpectingOperand,
    /// Inside the parentheses of a geo function.
    InGeoArguments,
}

/// Returns true for characters that end an unquoted word.
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | ',' | '"' | '\'')
}

/// Lexer for tokenizing filter expressions.
pub struct Lexer {
    chars: Vec<char>,
    /// Current character index into `chars`.
    position: usize,
    state: LexState,
    tokens: Vec<Token>,
}

impl Lexer {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            state: LexState::Default,
            tokens: Vec::new(),
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    /// Consumes and returns the next character.
    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
    }

    /// Returns true if a keyword ending at `end` is a whole word.
    fn at_boundary(&self, end: usize) -> bool {
        match self.chars.get(end) {
            None => true,
            Some(&c) => is_delimiter(c) || is_comparison_start(c),
        }
    }

    fn push(&mut self, token: Token) {
        trace!(kind = token.kind.name(), text = %token.text, "token");
        self.tokens.push(token);
    }

    fn last_text(&self) -> String {
        self.tokens
            .last()
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    /// Reads an unquoted word.
    ///
    /// Fields and operand values also stop at the start of a comparison
    /// operator, so `rating>=3` splits into three tokens.
    fn read_word(&mut self, stop_at_operator: bool) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if is_delimiter(c) || (stop_at_operator && is_comparison_start(c)) {
                break;
            }
            word.push(c);
            self.position += 1;
        }
        word
    }

    /// Reads the body of a quoted literal; the opening quote is already consumed.
    ///
    /// `\\` and an escaped `quote` resolve to the escaped character. Any
    /// other escape, including the other quote character, is kept as written.
    fn read_quoted_string(&mut self, quote: char) -> LexResult<String> {
        let mut text = String::new();
        loop {
            match self.next_char() {
                None => return Err(LexError::UnterminatedString { text }),
                Some('\\') => match self.next_char() {
                    Some(escaped) if escaped == quote || escaped == '\\' => {
                        text.push(escaped)
                    }
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => {
                        text.push('\\');
                        return Err(LexError::UnterminatedString { text });
                    }
                },
                Some(c) if c == quote => return Ok(text),
                Some(c) => text.push(c),
            }
        }
    }

    /// Matches a possibly multi-word keyword at the current position.
    ///
    /// Words may be separated by any run of whitespace. Returns the index just
    /// past the keyword when it matches as a whole word.
    fn match_keyword(&self, keyword: &str) -> Option<usize> {
        let mut pos = self.position;
        for (i, word) in keyword.split(' ').enumerate() {
            if i > 0 {
                let start = pos;
                while self.chars.get(pos).is_some_and(|c| c.is_whitespace()) {
                    pos += 1;
                }
                if pos == start {
                    return None;
                }
            }
            for expected in word.chars() {
                if self.chars.get(pos) != Some(&expected) {
                    return None;
                }
                pos += 1;
            }
        }
        self.at_boundary(pos).then_some(pos)
    }

    /// Greedily matches a connective, trying the longest candidate first.
    fn match_connective(&self) -> Option<(Connective, usize)> {
        let remaining = self.chars.len() - self.position;
        for len in (1..=longest_connective().min(remaining)).rev() {
            let end = self.position + len;
            let candidate: String = self.chars[self.position..end].iter().collect();
            if let Some(connective) = Connective::lookup(&candidate) {
                if self.at_boundary(end) {
                    return Some((connective, end));
                }
            }
        }
        None
    }

    /// Matches the longest keyword operator at the current position.
    fn match_keyword_operator(&self) -> Option<(Operator, usize)> {
        keyword_operators()
            .iter()
            .find_map(|&op| self.match_keyword(op.as_str()).map(|end| (op, end)))
    }

    /// Matches `_geoRadius` or `_geoBoundingBox` immediately followed by `(`.
    fn match_geo_function(&self) -> Option<(Operator, usize)> {
        [Operator::GeoRadius, Operator::GeoBoundingBox]
            .into_iter()
            .find_map(|op| {
                let name: Vec<char> = op.as_str().chars().collect();
                let end = self.position + name.len();
                let matches = self.chars.get(self.position..end) == Some(name.as_slice())
                    && self.chars.get(end) == Some(&'(');
                matches.then_some((op, end))
            })
    }

    /// Lexes a comparison operator, longest match first, so `>=` never
    /// splits into `>` and a stray `=`.
    fn lex_comparison(&mut self) -> LexResult<()> {
        let remaining = self.chars.len() - self.position;
        for len in (1..=longest_comparison_operator().min(remaining)).rev() {
            let end = self.position + len;
            let candidate: String = self.chars[self.position..end].iter().collect();
            if is_comparison_operator(&candidate) {
                self.position = end;
                self.push(Token::new(TokenKind::CompareOperator, candidate));
                return Ok(());
            }
        }
        let start = self.peek().map(String::from).unwrap_or_default();
        Err(LexError::invalid_operator(start))
    }

    /// Returns true if the next word, after optional whitespace, is `TO`.
    fn next_word_is_to(&mut self) -> bool {
        let saved = self.position;
        self.skip_whitespace();
        let found = self.match_keyword(Operator::To.as_str()).is_some();
        self.position = saved;
        found
    }

    /// Pushes a non-operator word read after a field.
    ///
    /// With `TO` next it is the lower bound of a range. Otherwise the parser
    /// rejects it, and scanning goes on as if the word were an operator.
    fn word_after_field(&mut self, text: String, quoted: bool) {
        self.push(Token::new(TokenKind::Value { quoted }, text));
        if self.next_word_is_to() {
            self.state = LexState::ExpectingOperator;
            return;
        }

        let saved = self.position;
        self.skip_whitespace();
        let at_end = self.peek().is_none();
        self.position = saved;
        self.state = if at_end {
            LexState::Default
        } else {
            LexState::ExpectingOperand
        };
    }

    fn push_paren(&mut self, c: char) {
        self.position += 1;
        let kind = if c == '(' {
            TokenKind::ParenOpen
        } else {
            TokenKind::ParenClose
        };
        self.push(Token::new(kind, c));
    }

    fn open_quote(&mut self, quote: char, resume: Resume) {
        self.position += 1;
        self.state = LexState::InQuotedLiteral { quote, resume };
    }

    /// Advances the state machine by one token.
    ///
    /// Returns `Ok(false)` once the input is exhausted in a state where
    /// ending is legal.
    fn step(&mut self) -> LexResult<bool> {
        match self.state {
            LexState::Default => self.step_default(),
            LexState::ExpectingOperator => self.step_expecting_operator(),
            LexState::ExpectingOperand => self.step_expecting_operand(),
            LexState::InList => self.step_in_list(),
            LexState::InGeoArguments => self.step_in_geo_arguments(),
            LexState::InQuotedLiteral { quote, resume } => {
                self.step_quoted(quote, resume)?;
                Ok(true)
            }
        }
    }

    fn step_default(&mut self) -> LexResult<bool> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Ok(false);
        };

        match c {
            '(' | ')' => self.push_paren(c),
            ']' => return Err(LexError::UnbalancedListBrackets),
            '[' | ',' => return Err(LexError::UnexpectedCharacter(c)),
            '"' | '\'' => self.open_quote(c, Resume::Field),
            _ if is_comparison_start(c) => {
                // No field before the operator; the parser reports it.
                self.lex_comparison()?;
                self.state = LexState::ExpectingOperand;
            }
            _ => {
                if let Some((connective, end)) = self.match_connective() {
                    self.position = end;
                    self.push(Token::connective(connective));
                } else if let Some((op, end)) = self.match_geo_function() {
                    self.position = end;
                    self.push(Token::operator(op));
                    self.push_paren('(');
                    self.state = LexState::InGeoArguments;
                } else {
                    let word = self.read_word(true);
                    self.push(Token::field(word));
                    self.state = LexState::ExpectingOperator;
                }
            }
        }
        Ok(true)
    }

    fn step_expecting_operator(&mut self) -> LexResult<bool> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Ok(false);
        };

        match c {
            '(' | ')' => {
                self.push_paren(c);
                self.state = LexState::Default;
            }
            ']' => return Err(LexError::UnbalancedListBrackets),
            '[' | ',' => return Err(LexError::UnexpectedCharacter(c)),
            '"' | '\'' => self.open_quote(c, Resume::RangeBound),
            _ if is_comparison_start(c) => {
                self.lex_comparison()?;
                self.state = LexState::ExpectingOperand;
            }
            _ => {
                if let Some((op, end)) = self.match_keyword_operator() {
                    self.position = end;
                    self.push(Token::operator(op));
                    self.state = match op.category() {
                        OperatorCategory::Existence
                        | OperatorCategory::Null
                        | OperatorCategory::Empty => LexState::Default,
                        _ => LexState::ExpectingOperand,
                    };
                } else if let Some((connective, end)) = self.match_connective() {
                    // Missing operator; the parser reports it.
                    self.position = end;
                    self.push(Token::connective(connective));
                    self.state = LexState::Default;
                } else {
                    let word = self.read_word(true);
                    self.word_after_field(word, false);
                }
            }
        }
        Ok(true)
    }

    fn step_expecting_operand(&mut self) -> LexResult<bool> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Err(LexError::UnexpectedEOF {
                after: self.last_text(),
            });
        };

        match c {
            '(' | ')' => {
                self.push_paren(c);
                self.state = LexState::Default;
            }
            '[' => {
                self.position += 1;
                self.push(Token::new(TokenKind::ListOpen, "["));
                self.state = LexState::InList;
            }
            ']' => return Err(LexError::UnbalancedListBrackets),
            ',' => return Err(LexError::UnexpectedCharacter(c)),
            '"' | '\'' => self.open_quote(c, Resume::Operand),
            // A second operator where a value belongs; the parser reports it.
            _ if is_comparison_start(c) => self.lex_comparison()?,
            _ => {
                let word = self.read_word(true);
                self.push(Token::value(word));
                self.state = LexState::Default;
            }
        }
        Ok(true)
    }

    fn step_in_list(&mut self) -> LexResult<bool> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Err(LexError::UnbalancedListBrackets);
        };

        match c {
            ']' => {
                self.position += 1;
                self.push(Token::new(TokenKind::ListClose, "]"));
                self.state = LexState::Default;
            }
            ',' => {
                self.position += 1;
                self.push(Token::new(TokenKind::ListSeparator, ","));
            }
            '[' => return Err(LexError::UnexpectedCharacter(c)),
            '(' | ')' => self.push_paren(c),
            '"' | '\'' => self.open_quote(c, Resume::ListItem),
            _ => {
                let word = self.read_word(false);
                self.push(Token::value(word));
            }
        }
        Ok(true)
    }

    fn step_in_geo_arguments(&mut self) -> LexResult<bool> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Err(LexError::UnexpectedEOF {
                after: self.last_text(),
            });
        };

        match c {
            ')' => {
                self.push_paren(c);
                self.state = LexState::Default;
            }
            '(' => self.push_paren(c),
            ',' => {
                self.position += 1;
                self.push(Token::new(TokenKind::ListSeparator, ","));
            }
            '[' => {
                self.position += 1;
                self.push(Token::new(TokenKind::ListOpen, "["));
            }
            ']' => {
                self.position += 1;
                self.push(Token::new(TokenKind::ListClose, "]"));
            }
            '"' | '\'' => self.open_quote(c, Resume::GeoArgument),
            _ => {
                let word = self.read_word(false);
                self.push(Token::value(word));
            }
        }
        Ok(true)
    }

    fn step_quoted(&mut self, quote: char, resume: Resume) -> LexResult<()> {
        let text = self.read_quoted_string(quote)?;
        if resume == Resume::RangeBound {
            self.word_after_field(text, true);
            return Ok(());
        }

        self.state = match resume {
            Resume::Field => {
                self.push(Token::field(text));
                LexState::ExpectingOperator
            }
            Resume::RangeBound => LexState::ExpectingOperator,
            Resume::Operand => {
                self.push(Token::quoted(text));
                LexState::Default
            }
            Resume::ListItem => {
                self.push(Token::quoted(text));
                LexState::InList
            }
            Resume::GeoArgument => {
                self.push(Token::quoted(text));
                LexState::InGeoArguments
            }
        };
        Ok(())
    }

    /// Collects all tokens, failing on the first lexical error.
    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        while self.step()? {}
        Ok(self.tokens)
    }
}

/// Tokenizes a filter expression.
pub fn tokenize(input: &str) -> LexResult<Vec<Token>> {
    Lexer::new(input).tokenize()
}
