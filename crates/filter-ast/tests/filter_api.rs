//! Tests for the public filter API: tokenize, parse and serialize.

use filter_ast_rs::filter::{
    keyword_operators, tokenize, Arity, Connective, FilterError, FilterParser, LexError, Literal,
    Node, Operator, OperatorCategory, ParseError, Token, TokenKind,
};
use serde_json::json;

#[test]
fn test_tokenize_then_parse() {
    let tokens = tokenize(r#"genre IN ["drama", "comedy"] AND NOT rating < 2"#).unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::field("genre"),
            Token::operator(Operator::In),
            Token::new(TokenKind::ListOpen, "["),
            Token::quoted("drama"),
            Token::new(TokenKind::ListSeparator, ","),
            Token::quoted("comedy"),
            Token::new(TokenKind::ListClose, "]"),
            Token::connective(Connective::And),
            Token::connective(Connective::Not),
            Token::field("rating"),
            Token::operator(Operator::LessThan),
            Token::value("2"),
        ]
    );

    let tree = FilterParser::parse_tokens(tokens).unwrap();
    assert_eq!(
        tree,
        Node::and(vec![
            Node::predicate(
                "genre",
                Operator::In,
                vec![Literal::from("drama"), Literal::from("comedy")]
            ),
            Node::negate(Node::predicate(
                "rating",
                Operator::LessThan,
                vec![Literal::Number(2.0)]
            )),
        ])
    );
}

#[test]
fn test_parse_is_independent_per_call() {
    let first = FilterParser::parse("a = 1 AND b = 2").unwrap();
    let _ = FilterParser::parse("(((").unwrap_err();
    let second = FilterParser::parse("a = 1 AND b = 2").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parse_from_many_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                FilterParser::parse(&format!("rating >= {i} OR genre IN [x]")).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let tree = handle.join().unwrap();
        assert_eq!(tree.fields(), vec!["rating", "genre"]);
        assert_eq!(
            tree.to_string(),
            format!(r#"rating >= {i} OR genre IN ["x"]"#)
        );
    }
}

#[test]
fn test_serialize_predicate() {
    let tree = FilterParser::parse(r#"genre IN ["drama", 3, true]"#).unwrap();
    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({
            "type": "predicate",
            "field": "genre",
            "operator": "IN",
            "operands": ["drama", 3.0, true]
        })
    );
}

#[test]
fn test_serialize_logical() {
    let tree = FilterParser::parse("NOT a EXISTS OR _geoRadius(1, 2, 3)").unwrap();
    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({
            "type": "logical",
            "connective": "OR",
            "children": [
                {
                    "type": "logical",
                    "connective": "NOT",
                    "children": [
                        {"type": "predicate", "field": "a", "operator": "EXISTS", "operands": []}
                    ]
                },
                {
                    "type": "predicate",
                    "field": "_geo",
                    "operator": "_geoRadius",
                    "operands": [1.0, 2.0, 3.0]
                }
            ]
        })
    );
}

#[test]
fn test_serialize_category() {
    assert_eq!(
        serde_json::to_value(OperatorCategory::Existence).unwrap(),
        json!("existence")
    );
    assert_eq!(
        serde_json::to_value(Operator::NotStartsWith).unwrap(),
        json!("NOT STARTS WITH")
    );
}

#[test]
fn test_catalog_metadata() {
    assert_eq!(Operator::ALL.len(), 21);
    assert_eq!(Operator::In.arity(), Arity::List);
    assert_eq!(Operator::To.arity(), Arity::Exactly(2));
    assert_eq!(Operator::GeoBoundingBox.arity(), Arity::Exactly(4));
    assert!(keyword_operators().contains(&Operator::IsNotEmpty));
    assert!(!keyword_operators().contains(&Operator::GreaterThanOrEqual));
}

#[test]
fn test_errors_are_typed_by_phase() {
    assert!(matches!(
        FilterParser::parse("a = 'unterminated"),
        Err(FilterError::Lex(LexError::UnterminatedString { .. }))
    ));
    assert!(matches!(
        FilterParser::parse("a = 1 OR"),
        Err(FilterError::Parse(ParseError::DanglingConnective { .. }))
    ));
}
