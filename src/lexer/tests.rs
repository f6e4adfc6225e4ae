//! Unit tests for the lexer module.
//!
//! - Keywords and identifiers
//! - Numeric literals
//! - Operators and punctuation
//! - Comments
//! - Error cases

use super::{lexer::tokenize, tokens::TokenKind};

#[test]
fn test_tokenize_keywords() {
    let source = "def extern if then else for in binary unary var".to_string();
    let tokens = tokenize(source, Some("test.k".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Def);
    assert_eq!(tokens[1].kind, TokenKind::Extern);
    assert_eq!(tokens[2].kind, TokenKind::If);
    assert_eq!(tokens[3].kind, TokenKind::Then);
    assert_eq!(tokens[4].kind, TokenKind::Else);
    assert_eq!(tokens[5].kind, TokenKind::For);
    assert_eq!(tokens[6].kind, TokenKind::In);
    assert_eq!(tokens[7].kind, TokenKind::Binary);
    assert_eq!(tokens[8].kind, TokenKind::Unary);
    assert_eq!(tokens[9].kind, TokenKind::Var);
    assert_eq!(tokens[10].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo bar baz_123 _underscore definitely".to_string();
    let tokens = tokenize(source, Some("test.k".to_string())).unwrap();

    let values: Vec<&str> = tokens[..5].iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, ["foo", "bar", "baz_123", "_underscore", "definitely"]);
    assert!(tokens[..5].iter().all(|t| t.kind == TokenKind::Identifier));
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 3.14 0 100. .5".to_string();
    let tokens = tokenize(source, Some("test.k".to_string())).unwrap();

    let values: Vec<&str> = tokens[..5].iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, ["42", "3.14", "0", "100.", ".5"]);
    assert!(tokens[..5].iter().all(|t| t.kind == TokenKind::Number));
}

#[test]
fn test_tokenize_operators() {
    let source = "a+b*c<d = !e | f : g".to_string();
    let tokens = tokenize(source, Some("test.k".to_string())).unwrap();

    let operators: Vec<char> = tokens.iter().filter_map(|t| t.operator()).collect();
    assert_eq!(operators, ['+', '*', '<', '=', '!', '|', ':']);
}

#[test]
fn test_tokenize_punctuation() {
    let source = "foo(a, b);".to_string();
    let tokens = tokenize(source, Some("test.k".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].kind, TokenKind::OpenParen);
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
    assert_eq!(tokens[3].kind, TokenKind::Comma);
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[5].kind, TokenKind::CloseParen);
    assert_eq!(tokens[6].kind, TokenKind::Semicolon);
    assert_eq!(tokens[7].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_comments() {
    let source = "# a comment with def and 1.0\nx # trailing\n".to_string();
    let tokens = tokenize(source, Some("test.k".to_string())).unwrap();

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "x");
}

#[test]
fn test_token_spans() {
    let source = "def foo".to_string();
    let tokens = tokenize(source, Some("test.k".to_string())).unwrap();

    assert_eq!(tokens[1].span.start.0, 4);
    assert_eq!(tokens[1].span.end.0, 7);
    assert_eq!(tokens[1].span.start.1.as_str(), "test.k");
}

#[test]
fn test_unnamed_source_is_shell() {
    let tokens = tokenize("1".to_string(), None).unwrap();

    assert_eq!(tokens[0].span.start.1.as_str(), "shell");
}

#[test]
fn test_unrecognised_character() {
    let source = "x + é".to_string();
    let error = tokenize(source, Some("test.k".to_string())).unwrap_err();

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().unwrap().0, 4);
}

#[test]
fn test_empty_source() {
    let tokens = tokenize(String::new(), None).unwrap();

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::EOF);
}
