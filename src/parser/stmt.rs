use crate::{
    ast::ast::{Function, Node, OperatorKind, Prototype},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::parser::Parser;

pub fn parse_node(parser: &mut Parser) -> Result<Node, Error> {
    if let Some(handler) = parser.get_stmt_lookup().get(&parser.current_token_kind()).copied() {
        return handler(parser);
    }

    parse_top_level_expr(parser)
}

/// A bare expression becomes the body of an anonymous function.
pub fn parse_top_level_expr(parser: &mut Parser) -> Result<Node, Error> {
    let body = parse_expr(parser, BindingPower::DEFAULT)?;

    Ok(Node::Function(Function {
        prototype: Prototype::anonymous(),
        body,
    }))
}

/// `def prototype body`
///
/// A binary operator's precedence is installed as soon as its prototype is
/// read, so the body and everything after it parse with it.
pub fn parse_definition(parser: &mut Parser) -> Result<Node, Error> {
    parser.advance();
    let prototype = parse_prototype(parser)?;

    if let (Some(operator), Some(precedence)) =
        (prototype.operator_char(), prototype.binary_precedence())
    {
        parser.binary_operator(operator, BindingPower(precedence));
    }

    let body = parse_expr(parser, BindingPower::DEFAULT)?;

    Ok(Node::Function(Function { prototype, body }))
}

/// `extern prototype`
pub fn parse_extern(parser: &mut Parser) -> Result<Node, Error> {
    parser.advance();
    Ok(Node::Prototype(parse_prototype(parser)?))
}

/// `name(args)`, `unary<op>(arg)` or `binary<op> [precedence] (lhs rhs)`.
///
/// Parameter names may be separated by whitespace or commas.
pub fn parse_prototype(parser: &mut Parser) -> Result<Prototype, Error> {
    let start = parser.get_position();

    let (name, operator) = match parser.current_token_kind() {
        TokenKind::Identifier => (parser.advance().value, None),
        TokenKind::Unary => {
            parser.advance();
            let operator = expect_operator_char(parser)?;
            (format!("unary{}", operator), Some(OperatorKind::Unary))
        }
        TokenKind::Binary => {
            parser.advance();
            let operator = expect_operator_char(parser)?;
            let precedence = parse_precedence(parser)?;
            (
                format!("binary{}", operator),
                Some(OperatorKind::Binary { precedence }),
            )
        }
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from("expected function name in prototype"),
                },
                parser.get_position(),
            ))
        }
    };

    parser.expect(TokenKind::OpenParen)?;

    let mut args = vec![];
    loop {
        match parser.current_token_kind() {
            TokenKind::Identifier => args.push(parser.advance().value),
            TokenKind::Comma => {
                parser.advance();
            }
            _ => break,
        }
    }

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected ')' in prototype"),
        },
        parser.get_position(),
    );
    parser.expect_error(TokenKind::CloseParen, Some(error))?;

    let expected = match operator {
        Some(OperatorKind::Unary) => Some(1),
        Some(OperatorKind::Binary { .. }) => Some(2),
        None => None,
    };

    if let Some(expected) = expected {
        if args.len() != expected {
            return Err(Error::new(
                ErrorImpl::InvalidOperatorArity {
                    operator: name.clone(),
                    expected,
                    received: args.len(),
                },
                start,
            ));
        }
    }

    Ok(Prototype {
        name,
        args,
        operator,
    })
}

fn expect_operator_char(parser: &mut Parser) -> Result<char, Error> {
    match parser.current_token().operator() {
        Some(operator) => {
            parser.advance();
            Ok(operator)
        }
        None => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected an operator character"),
            },
            parser.get_position(),
        )),
    }
}

/// Optional precedence of a binary operator definition, 1 to 100.
fn parse_precedence(parser: &mut Parser) -> Result<u32, Error> {
    if parser.current_token_kind() != TokenKind::Number {
        return Ok(BindingPower::USER_DEFAULT.0);
    }

    let token = parser.advance();
    let value = token.value.parse::<f64>().map_err(|_| {
        Error::new(
            ErrorImpl::NumberParseError {
                token: token.value.clone(),
            },
            token.span.start.clone(),
        )
    })?;

    if value < 1.0 || value > BindingPower::MAX_USER as f64 || value.fract() != 0.0 {
        return Err(Error::new(
            ErrorImpl::InvalidPrecedence { value },
            token.span.start,
        ));
    }

    Ok(value as u32)
}
