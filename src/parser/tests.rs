//! Unit tests for the parser module.
//!
//! - Definitions, externs and top-level expressions
//! - Operator precedence and associativity
//! - User-defined operators
//! - Control flow and var expressions
//! - Error cases

use super::{
    lookups::BindingPower,
    parser::{parse, Parser},
};
use crate::{
    ast::ast::{Expr, Function, Node, OperatorKind, Prototype},
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Vec<Node> {
    let tokens = tokenize(source.to_string(), Some("test.k".to_string())).unwrap();
    let (_, result) = parse(tokens);
    result.unwrap()
}

fn top_level_body(node: &Node) -> &Expr {
    match node {
        Node::Function(Function { prototype, body }) if prototype.is_anonymous() => body,
        _ => panic!("expected a top-level expression, found {:?}", node),
    }
}

fn num(value: f64) -> Expr {
    Expr::Number(value)
}

#[test]
fn test_parse_arithmetic_precedence() {
    let nodes = parse_source("2 + 3 * 4");

    assert_eq!(
        top_level_body(&nodes[0]),
        &Expr::binary('+', num(2.0), Expr::binary('*', num(3.0), num(4.0)))
    );
}

#[test]
fn test_parse_left_associativity() {
    let nodes = parse_source("8 - 4 - 2");

    assert_eq!(
        top_level_body(&nodes[0]),
        &Expr::binary('-', Expr::binary('-', num(8.0), num(4.0)), num(2.0))
    );
}

#[test]
fn test_parse_assignment_right_associative() {
    let nodes = parse_source("a = b = 1 + 2");

    assert_eq!(
        top_level_body(&nodes[0]),
        &Expr::binary(
            '=',
            Expr::variable("a"),
            Expr::binary('=', Expr::variable("b"), Expr::binary('+', num(1.0), num(2.0)))
        )
    );
}

#[test]
fn test_parse_grouping() {
    let nodes = parse_source("(2 + 3) * 4");

    assert_eq!(
        top_level_body(&nodes[0]),
        &Expr::binary('*', Expr::binary('+', num(2.0), num(3.0)), num(4.0))
    );
}

#[test]
fn test_parse_function_definition() {
    let nodes = parse_source("def add(a b) a + b");

    assert_eq!(
        nodes[0],
        Node::Function(Function {
            prototype: Prototype::new("add", &["a", "b"]),
            body: Expr::binary('+', Expr::variable("a"), Expr::variable("b")),
        })
    );
}

#[test]
fn test_parse_comma_separated_parameters() {
    let nodes = parse_source("extern atan2(y, x);");

    assert_eq!(nodes[0], Node::Prototype(Prototype::new("atan2", &["y", "x"])));
}

#[test]
fn test_parse_extern_and_semicolons() {
    let nodes = parse_source(";; extern sin(x); ; sin(1.0);");

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0], Node::Prototype(Prototype::new("sin", &["x"])));
    assert_eq!(
        top_level_body(&nodes[1]),
        &Expr::Call {
            callee: String::from("sin"),
            arguments: vec![num(1.0)],
        }
    );
}

#[test]
fn test_parse_call_arguments() {
    let nodes = parse_source("foo(1, x + 2, bar())");

    assert_eq!(
        top_level_body(&nodes[0]),
        &Expr::Call {
            callee: String::from("foo"),
            arguments: vec![
                num(1.0),
                Expr::binary('+', Expr::variable("x"), num(2.0)),
                Expr::Call {
                    callee: String::from("bar"),
                    arguments: vec![],
                },
            ],
        }
    );
}

#[test]
fn test_parse_if_expression() {
    let nodes = parse_source("if x < 3 then 1 else 2");

    assert_eq!(
        top_level_body(&nodes[0]),
        &Expr::If {
            condition: Box::new(Expr::binary('<', Expr::variable("x"), num(3.0))),
            then_branch: Box::new(num(1.0)),
            else_branch: Box::new(num(2.0)),
        }
    );
}

#[test]
fn test_parse_for_expression() {
    let nodes = parse_source("for i = 0, i < 5, 1.0 in i");

    assert_eq!(
        top_level_body(&nodes[0]),
        &Expr::For {
            counter: String::from("i"),
            start: Box::new(num(0.0)),
            test: Box::new(Expr::binary('<', Expr::variable("i"), num(5.0))),
            step: Some(Box::new(num(1.0))),
            body: Box::new(Expr::variable("i")),
        }
    );
}

#[test]
fn test_parse_for_without_step() {
    let nodes = parse_source("for i = 1, i < 3 in 0");

    match top_level_body(&nodes[0]) {
        Expr::For { step, .. } => assert!(step.is_none()),
        other => panic!("expected for, found {:?}", other),
    }
}

#[test]
fn test_parse_var_expression() {
    let nodes = parse_source("var a = 1, b in a + b");

    assert_eq!(
        top_level_body(&nodes[0]),
        &Expr::Var {
            bindings: vec![(String::from("a"), Some(num(1.0))), (String::from("b"), None)],
            body: Box::new(Expr::binary('+', Expr::variable("a"), Expr::variable("b"))),
        }
    );
}

#[test]
fn test_parse_unary_binds_tightly() {
    let nodes = parse_source("!x * 2");

    assert_eq!(
        top_level_body(&nodes[0]),
        &Expr::binary(
            '*',
            Expr::Unary {
                operator: '!',
                operand: Box::new(Expr::variable("x")),
            },
            num(2.0)
        )
    );
}

#[test]
fn test_parse_unary_operator_definition() {
    let nodes = parse_source("def unary!(v) if v then 0 else 1");

    match &nodes[0] {
        Node::Function(function) => {
            assert_eq!(function.prototype.name, "unary!");
            assert_eq!(function.prototype.operator, Some(OperatorKind::Unary));
            assert_eq!(function.prototype.operator_char(), Some('!'));
        }
        other => panic!("expected a definition, found {:?}", other),
    }
}

#[test]
fn test_parse_binary_operator_installs_precedence() {
    let source = "def binary| 5 (a b) if a then 1 else if b then 1 else 0;\n1 + 2 | 3";
    let tokens = tokenize(source.to_string(), None).unwrap();
    let (parser, result) = parse(tokens);
    let nodes = result.unwrap();

    assert_eq!(parser.get_bp_lookup().get(&'|'), Some(&BindingPower(5)));
    assert_eq!(
        top_level_body(&nodes[1]),
        &Expr::binary('|', Expr::binary('+', num(1.0), num(2.0)), num(3.0))
    );
}

#[test]
fn test_parse_binary_operator_default_precedence() {
    let tokens = tokenize("def binary% (a b) a".to_string(), None).unwrap();
    let (parser, result) = parse(tokens);

    assert!(result.is_ok());
    assert_eq!(parser.get_bp_lookup().get(&'%'), Some(&BindingPower::USER_DEFAULT));
}

#[test]
fn test_parse_rejects_bad_operator_arity() {
    let tokens = tokenize("def binary| 5 (a) a".to_string(), None).unwrap();
    let (_, result) = parse(tokens);

    assert_eq!(result.unwrap_err().get_error_name(), "InvalidOperatorArity");
}

#[test]
fn test_parse_rejects_bad_precedence() {
    let tokens = tokenize("def binary| 500 (a b) a".to_string(), None).unwrap();
    let (_, result) = parse(tokens);

    assert_eq!(result.unwrap_err().get_error_name(), "InvalidPrecedence");
}

#[test]
fn test_parse_missing_else() {
    let tokens = tokenize("if x then 1".to_string(), Some("test.k".to_string())).unwrap();
    let (_, result) = parse(tokens);

    assert_eq!(result.unwrap_err().get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_unclosed_call() {
    let tokens = tokenize("foo(1 2)".to_string(), None).unwrap();
    let (_, result) = parse(tokens);

    assert!(result.is_err());
}

#[test]
fn test_next_node_recovers_after_skip() {
    let tokens = tokenize(") 1 + 1".to_string(), None).unwrap();
    let mut parser = Parser::new(tokens);

    assert!(parser.next_node().unwrap().is_err());
    parser.advance();

    let node = parser.next_node().unwrap().unwrap();
    assert_eq!(top_level_body(&node), &Expr::binary('+', num(1.0), num(1.0)));
    assert!(parser.next_node().is_none());
}

#[test]
fn test_top_level_expression_detection() {
    let nodes = parse_source("def main() 1; def other() 2; 3; extern sin(x)");

    let flags: Vec<bool> = nodes.iter().map(Node::is_top_level_expression).collect();
    assert_eq!(flags, [true, false, true, false]);
}
