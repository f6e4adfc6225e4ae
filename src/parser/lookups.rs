use std::collections::HashMap;

use crate::{
    ast::ast::{Expr, Node},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{expr::*, parser::Parser, stmt::*};

/// Operator precedence. Higher binds tighter.
///
/// Builtin operators use the named constants; user-defined binary operators
/// carry the precedence given in their definition.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct BindingPower(pub u32);

impl BindingPower {
    pub const DEFAULT: BindingPower = BindingPower(0);
    pub const ASSIGNMENT: BindingPower = BindingPower(2);
    pub const RELATIONAL: BindingPower = BindingPower(10);
    pub const ADDITIVE: BindingPower = BindingPower(20);
    pub const USER_DEFAULT: BindingPower = BindingPower(30);
    pub const MULTIPLICATIVE: BindingPower = BindingPower(40);
    /// Above every binary operator, so a unary operand never extends into
    /// an infix expression.
    pub const UNARY: BindingPower = BindingPower(1000);

    pub const MAX_USER: u32 = 100;
}

pub type StmtHandler = fn(&mut Parser) -> Result<Node, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Expr, Error>;
pub type LEDHandler = fn(&mut Parser, Expr, BindingPower) -> Result<Expr, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    // Builtin binary operators
    parser.binary_operator('=', BindingPower::ASSIGNMENT);
    parser.binary_operator('<', BindingPower::RELATIONAL);
    parser.binary_operator('+', BindingPower::ADDITIVE);
    parser.binary_operator('-', BindingPower::ADDITIVE);
    parser.binary_operator('*', BindingPower::MULTIPLICATIVE);
    parser.binary_operator('/', BindingPower::MULTIPLICATIVE);

    parser.led(TokenKind::Operator, parse_operator_expr);

    // Literals, symbols and compound expressions
    parser.nud(TokenKind::Number, parse_number_expr);
    parser.nud(TokenKind::Identifier, parse_identifier_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::If, parse_if_expr);
    parser.nud(TokenKind::For, parse_for_expr);
    parser.nud(TokenKind::Var, parse_var_expr);
    parser.nud(TokenKind::Operator, parse_unary_expr);

    // Top-level definitions
    parser.stmt(TokenKind::Def, parse_definition);
    parser.stmt(TokenKind::Extern, parse_extern);
}

// Lookup tables inside parser struct, so it's easier
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<char, BindingPower>;
