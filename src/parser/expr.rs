use crate::{
    ast::ast::Expr,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(unexpected_token(parser, "expected an expression"));
    };

    let mut left = nud(parser)?;

    // While the next operator binds tighter than `bp`, keep extending lhs
    while parser.current_binding_power() > bp {
        let token_kind = parser.current_token_kind();
        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(unexpected_token(parser, "expected an operator"));
        };

        let binding_power = parser.current_binding_power();
        left = led(parser, left, binding_power)?;
    }

    Ok(left)
}

fn unexpected_token(parser: &Parser, message: &str) -> Error {
    Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from(message),
        },
        parser.get_position(),
    )
}

pub fn parse_number_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let value = parser.current_token().value.parse::<f64>().map_err(|_| {
        Error::new(
            ErrorImpl::NumberParseError {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        )
    })?;
    parser.advance();

    Ok(Expr::Number(value))
}

/// A bare name is a variable; a name followed by `(` is a call.
pub fn parse_identifier_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let name = parser.advance().value;

    if parser.current_token_kind() != TokenKind::OpenParen {
        return Ok(Expr::Variable(name));
    }

    parser.advance();

    let mut arguments = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            arguments.push(parse_expr(parser, BindingPower::DEFAULT)?);

            if parser.current_token_kind() == TokenKind::CloseParen {
                break;
            }

            let error = unexpected_token(parser, "expected ')' or ',' in argument list");
            parser.expect_error(TokenKind::Comma, Some(error))?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::Call {
        callee: name,
        arguments,
    })
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::DEFAULT)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// `if condition then expr else expr`
pub fn parse_if_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let condition = parse_expr(parser, BindingPower::DEFAULT)?;

    parser.expect(TokenKind::Then)?;
    let then_branch = parse_expr(parser, BindingPower::DEFAULT)?;

    parser.expect(TokenKind::Else)?;
    let else_branch = parse_expr(parser, BindingPower::DEFAULT)?;

    Ok(Expr::If {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
    })
}

/// `for counter = start, test[, step] in body`
pub fn parse_for_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();

    let error = unexpected_token(parser, "expected identifier after for");
    let counter = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    parser.expect_operator('=')?;
    let start = parse_expr(parser, BindingPower::DEFAULT)?;

    let error = unexpected_token(parser, "expected ',' after for start value");
    parser.expect_error(TokenKind::Comma, Some(error))?;
    let test = parse_expr(parser, BindingPower::DEFAULT)?;

    let step = if parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        Some(Box::new(parse_expr(parser, BindingPower::DEFAULT)?))
    } else {
        None
    };

    parser.expect(TokenKind::In)?;
    let body = parse_expr(parser, BindingPower::DEFAULT)?;

    Ok(Expr::For {
        counter,
        start: Box::new(start),
        test: Box::new(test),
        step,
        body: Box::new(body),
    })
}

/// `var name [= init] (, name [= init])* in body`
pub fn parse_var_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();

    let mut bindings = vec![];

    loop {
        let error = unexpected_token(parser, "expected identifier after var");
        let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

        let initializer = if parser.current_token().is_operator('=') {
            parser.advance();
            Some(parse_expr(parser, BindingPower::DEFAULT)?)
        } else {
            None
        };

        bindings.push((name, initializer));

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parser.expect(TokenKind::In)?;
    let body = parse_expr(parser, BindingPower::DEFAULT)?;

    Ok(Expr::Var {
        bindings,
        body: Box::new(body),
    })
}

pub fn parse_unary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let Some(operator) = operator_token.operator() else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value,
            },
            operator_token.span.start,
        ));
    };

    let operand = parse_expr(parser, BindingPower::UNARY)?;

    Ok(Expr::Unary {
        operator,
        operand: Box::new(operand),
    })
}

/// Infix handler for every operator token.
pub fn parse_operator_expr(
    parser: &mut Parser,
    left: Expr,
    bp: BindingPower,
) -> Result<Expr, Error> {
    if parser.current_token().is_operator('=') {
        parse_assignment_expr(parser, left, bp)
    } else {
        parse_binary_expr(parser, left, bp)
    }
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: Expr,
    bp: BindingPower,
) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let right = parse_expr(parser, bp)?;

    let Some(operator) = operator_token.operator() else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value,
            },
            operator_token.span.start,
        ));
    };

    Ok(Expr::binary(operator, left, right))
}

/// Assignment is right associative: `a = b = 1` is `a = (b = 1)`.
pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expr,
    bp: BindingPower,
) -> Result<Expr, Error> {
    parser.advance();
    let right = parse_expr(parser, BindingPower(bp.0.saturating_sub(1)))?;

    Ok(Expr::binary('=', left, right))
}
