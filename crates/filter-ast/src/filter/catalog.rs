//! Static catalog of filter operators and logical connectives.

use serde::{Serialize, Serializer};
use strsim::levenshtein;

/// Maximum Levenshtein distance to consider an operator as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// A predicate operator recognized by the filter language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // ==================== Comparison ====================
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `>=`
    GreaterThanOrEqual,
    /// `>`
    GreaterThan,
    /// `<=`
    LessThanOrEqual,
    /// `<`
    LessThan,

    // ==================== Set ====================
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,

    // ==================== Range ====================
    /// `TO`
    To,

    // ==================== Existence ====================
    /// `EXISTS`
    Exists,
    /// `NOT EXISTS`
    NotExists,

    // ==================== Null ====================
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,

    // ==================== Empty ====================
    /// `IS EMPTY`
    IsEmpty,
    /// `IS NOT EMPTY`
    IsNotEmpty,

    // ==================== String ====================
    /// `CONTAINS`
    Contains,
    /// `NOT CONTAINS`
    NotContains,
    /// `STARTS WITH`
    StartsWith,
    /// `NOT STARTS WITH`
    NotStartsWith,

    // ==================== Geo ====================
    /// `_geoRadius(lat, lng, distance)`
    GeoRadius,
    /// `_geoBoundingBox(lat, lng, lat, lng)`
    GeoBoundingBox,
}

/// The semantic class of an operator, which fixes the shape of its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorCategory {
    Comparison,
    Set,
    Range,
    Existence,
    Null,
    Empty,
    String,
    Geo,
}

/// How many operands an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// The operator terminates the predicate on its own.
    None,
    /// A single scalar operand.
    One,
    /// A list literal of any length, including zero.
    List,
    /// A fixed number of operands.
    Exactly(usize),
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::None => write!(f, "0"),
            Arity::One => write!(f, "1"),
            Arity::List => write!(f, "list"),
            Arity::Exactly(n) => write!(f, "{n}"),
        }
    }
}

impl Operator {
    /// Every operator in the catalog.
    pub const ALL: [Operator; 21] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterThanOrEqual,
        Operator::GreaterThan,
        Operator::LessThanOrEqual,
        Operator::LessThan,
        Operator::In,
        Operator::NotIn,
        Operator::To,
        Operator::Exists,
        Operator::NotExists,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::NotStartsWith,
        Operator::GeoRadius,
        Operator::GeoBoundingBox,
    ];

    /// Returns the canonical spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterThanOrEqual => ">=",
            Operator::GreaterThan => ">",
            Operator::LessThanOrEqual => "<=",
            Operator::LessThan => "<",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::To => "TO",
            Operator::Exists => "EXISTS",
            Operator::NotExists => "NOT EXISTS",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::IsEmpty => "IS EMPTY",
            Operator::IsNotEmpty => "IS NOT EMPTY",
            Operator::Contains => "CONTAINS",
            Operator::NotContains => "NOT CONTAINS",
            Operator::StartsWith => "STARTS WITH",
            Operator::NotStartsWith => "NOT STARTS WITH",
            Operator::GeoRadius => "_geoRadius",
            Operator::GeoBoundingBox => "_geoBoundingBox",
        }
    }

    /// Looks up an operator by its canonical spelling.
    ///
    /// Matching is case-sensitive and expects keyword operators with single
    /// spaces between words, the way the lexer emits them.
    pub fn lookup(text: &str) -> Option<Operator> {
        let op = match text {
            "=" => Operator::Equal,
            "!=" => Operator::NotEqual,
            ">=" => Operator::GreaterThanOrEqual,
            ">" => Operator::GreaterThan,
            "<=" => Operator::LessThanOrEqual,
            "<" => Operator::LessThan,
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            "TO" => Operator::To,
            "EXISTS" => Operator::Exists,
            "NOT EXISTS" => Operator::NotExists,
            "IS NULL" => Operator::IsNull,
            "IS NOT NULL" => Operator::IsNotNull,
            "IS EMPTY" => Operator::IsEmpty,
            "IS NOT EMPTY" => Operator::IsNotEmpty,
            "CONTAINS" => Operator::Contains,
            "NOT CONTAINS" => Operator::NotContains,
            "STARTS WITH" => Operator::StartsWith,
            "NOT STARTS WITH" => Operator::NotStartsWith,
            "_geoRadius" => Operator::GeoRadius,
            "_geoBoundingBox" => Operator::GeoBoundingBox,
            _ => return None,
        };
        Some(op)
    }

    /// Returns the category this operator belongs to.
    pub fn category(self) -> OperatorCategory {
        match self {
            Operator::Equal
            | Operator::NotEqual
            | Operator::GreaterThanOrEqual
            | Operator::GreaterThan
            | Operator::LessThanOrEqual
            | Operator::LessThan => OperatorCategory::Comparison,
            Operator::In | Operator::NotIn => OperatorCategory::Set,
            Operator::To => OperatorCategory::Range,
            Operator::Exists | Operator::NotExists => OperatorCategory::Existence,
            Operator::IsNull | Operator::IsNotNull => OperatorCategory::Null,
            Operator::IsEmpty | Operator::IsNotEmpty => OperatorCategory::Empty,
            Operator::Contains
            | Operator::NotContains
            | Operator::StartsWith
            | Operator::NotStartsWith => OperatorCategory::String,
            Operator::GeoRadius | Operator::GeoBoundingBox => OperatorCategory::Geo,
        }
    }

    /// Returns how many operands the operator takes.
    pub fn arity(self) -> Arity {
        match self {
            Operator::GeoRadius => Arity::Exactly(3),
            Operator::GeoBoundingBox => Arity::Exactly(4),
            _ => match self.category() {
                OperatorCategory::Comparison | OperatorCategory::String => Arity::One,
                OperatorCategory::Set => Arity::List,
                OperatorCategory::Range => Arity::Exactly(2),
                OperatorCategory::Existence
                | OperatorCategory::Null
                | OperatorCategory::Empty
                | OperatorCategory::Geo => Arity::None,
            },
        }
    }

    /// Returns true for operators spelled with letters (`IN`, `IS NULL`, ...).
    pub fn is_keyword(self) -> bool {
        !matches!(
            self.category(),
            OperatorCategory::Comparison | OperatorCategory::Geo
        )
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl OperatorCategory {
    /// Returns the lowercase category name.
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorCategory::Comparison => "comparison",
            OperatorCategory::Set => "set",
            OperatorCategory::Range => "range",
            OperatorCategory::Existence => "existence",
            OperatorCategory::Null => "null",
            OperatorCategory::Empty => "empty",
            OperatorCategory::String => "string",
            OperatorCategory::Geo => "geo",
        }
    }
}

impl std::fmt::Display for OperatorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A boolean connective joining predicates or groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connective {
    And,
    Or,
    Not,
}

impl Connective {
    /// Every connective keyword.
    pub const ALL: [Connective; 3] = [Connective::And, Connective::Or, Connective::Not];

    /// Returns the keyword spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
            Connective::Not => "NOT",
        }
    }

    /// Looks up a connective by its exact, uppercase keyword.
    pub fn lookup(text: &str) -> Option<Connective> {
        match text {
            "AND" => Some(Connective::And),
            "OR" => Some(Connective::Or),
            "NOT" => Some(Connective::Not),
            _ => None,
        }
    }
}

impl std::fmt::Display for Connective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Keyword operators, longest spelling first.
const KEYWORD_OPERATORS: [Operator; 13] = [
    Operator::NotStartsWith,
    Operator::NotContains,
    Operator::IsNotEmpty,
    Operator::IsNotNull,
    Operator::StartsWith,
    Operator::NotExists,
    Operator::IsEmpty,
    Operator::Contains,
    Operator::IsNull,
    Operator::NotIn,
    Operator::Exists,
    Operator::In,
    Operator::To,
];

/// Returns the keyword operators ordered for longest-match-first scanning.
pub fn keyword_operators() -> &'static [Operator] {
    &KEYWORD_OPERATORS
}

/// Length in characters of the longest connective keyword.
pub fn longest_connective() -> usize {
    Connective::ALL
        .iter()
        .map(|c| c.as_str().len())
        .max()
        .unwrap_or(0)
}

/// Length in characters of the longest symbolic comparison operator.
pub fn longest_comparison_operator() -> usize {
    Operator::ALL
        .iter()
        .filter(|op| op.category() == OperatorCategory::Comparison)
        .map(|op| op.as_str().len())
        .max()
        .unwrap_or(0)
}

/// Returns true if `ch` can begin a comparison operator.
pub fn is_comparison_start(ch: char) -> bool {
    matches!(ch, '=' | '!' | '>' | '<')
}

/// Returns true if `text` is a symbolic comparison operator.
pub fn is_comparison_operator(text: &str) -> bool {
    Operator::lookup(text).is_some_and(|op| op.category() == OperatorCategory::Comparison)
}

/// Returns true if a word found in operator position reads as a keyword
/// operator: all upper case, or a keyword operator in the wrong case.
pub fn looks_like_operator(word: &str) -> bool {
    let shouted = !word.is_empty() && word.chars().all(|c| c.is_ascii_uppercase() || c == '_');
    let upper = word.to_uppercase();
    shouted || KEYWORD_OPERATORS.iter().any(|op| op.as_str() == upper)
}

/// Finds the catalog operator closest to `text` by edit distance.
///
/// Comparison ignores case, so `contains` suggests `CONTAINS`. Returns `None`
/// for exact matches and for anything further than a few edits away.
pub fn suggest_operator(text: &str) -> Option<&'static str> {
    let query = text.to_uppercase();

    let (best_match, best_distance) = Operator::ALL
        .iter()
        .map(|op| {
            let name = op.as_str();
            (name, levenshtein(&query, &name.to_uppercase()))
        })
        .min_by_key(|(_, d)| *d)?;

    if best_match != text && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match)
    } else {
        None
    }
}
