//! Parser implementation for building the Abstract Syntax Tree.
//!
//! The parser pulls tokens one at a time from any token iterator, so it can
//! sit directly on the lexer's channel. Expressions are parsed with a Pratt
//! parser using NUD/LED handlers; top-level definitions use statement
//! handlers keyed by their leading keyword.
//!
//! It maintains lookup tables for:
//! - Top-level handlers (`def`, `extern`)
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence, including user-defined operators

use std::{
    collections::HashMap,
    mem,
    sync::mpsc::{self, Receiver},
    thread::{self, JoinHandle},
};

use tracing::debug;

use crate::{
    ast::ast::Node,
    display_error,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_node,
};

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// Remaining tokens
    tokens: Box<dyn Iterator<Item = Token>>,
    /// The token under the cursor; an EOF token once the input is drained
    current: Token,
    /// Lookup table for top-level definition handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Binding power of each binary operator character
    binding_power_lookup: BPLookup,
}

impl Parser {
    /// Creates a parser over `tokens` with the builtin lookup tables installed.
    pub fn new<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = Token>,
        I::IntoIter: 'static,
    {
        let mut tokens: Box<dyn Iterator<Item = Token>> = Box::new(tokens.into_iter());
        let current = tokens.next().unwrap_or_else(|| eof_token(&Position::null()));

        let mut parser = Parser {
            tokens,
            current,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
        };
        create_token_lookups(&mut parser);

        parser
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.current
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// Advances to the next token and returns the previous token.
    ///
    /// At the end of input the cursor stays on an EOF token.
    pub fn advance(&mut self) -> Token {
        let next = match self.tokens.next() {
            Some(token) => token,
            None => eof_token(&self.current.span.end),
        };

        mem::replace(&mut self.current, next)
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current.kind != expected_kind {
            match error {
                Some(error) => Err(error),
                None => Err(Error::new(
                    ErrorImpl::UnexpectedTokenDetailed {
                        token: self.current.value.clone(),
                        message: format!("expected {}", expected_kind),
                    },
                    self.get_position(),
                )),
            }
        } else {
            Ok(self.advance())
        }
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Expects a specific operator character, e.g. the `=` of a `for` header.
    pub fn expect_operator(&mut self, operator: char) -> Result<Token, Error> {
        if self.current.is_operator(operator) {
            Ok(self.advance())
        } else {
            Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: self.current.value.clone(),
                    message: format!("expected '{}'", operator),
                },
                self.get_position(),
            ))
        }
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current.kind != TokenKind::EOF
    }

    /// Returns a reference to the top-level handler lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Binding power of the current token as an infix operator.
    ///
    /// Anything that is not a known binary operator ends an expression.
    pub fn current_binding_power(&self) -> BindingPower {
        self.current
            .operator()
            .and_then(|operator| self.binding_power_lookup.get(&operator).copied())
            .unwrap_or(BindingPower::DEFAULT)
    }

    /// Registers a left denotation (infix) handler for a token kind.
    pub fn led(&mut self, kind: TokenKind, led_fn: LEDHandler) {
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token kind.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a top-level handler for a token kind.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Installs (or changes) the precedence of a binary operator.
    pub fn binary_operator(&mut self, operator: char, binding_power: BindingPower) {
        self.binding_power_lookup.insert(operator, binding_power);
    }

    /// Parses the next top-level unit, skipping stray semicolons.
    ///
    /// Returns `None` at the end of input. After an error the cursor is left
    /// on the offending token; callers that want to carry on should skip it.
    pub fn next_node(&mut self) -> Option<Result<Node, Error>> {
        while self.current.kind == TokenKind::Semicolon {
            self.advance();
        }

        if !self.has_tokens() {
            return None;
        }

        Some(parse_node(self))
    }

    /// Returns the position of the current token.
    pub fn get_position(&self) -> Position {
        self.current.span.start.clone()
    }
}

fn eof_token(at: &Position) -> Token {
    Token {
        kind: TokenKind::EOF,
        value: String::from("EOF"),
        span: Span {
            start: at.clone(),
            end: at.clone(),
        },
    }
}

/// Parses a whole token vector.
///
/// Stops at the first error. Returns the parser too, so callers can inspect
/// the operator table it ended up with.
pub fn parse(tokens: Vec<Token>) -> (Parser, Result<Vec<Node>, Error>) {
    let mut parser = Parser::new(tokens);
    let mut nodes = vec![];

    while let Some(node) = parser.next_node() {
        match node {
            Ok(node) => nodes.push(node),
            Err(error) => return (parser, Err(error)),
        }
    }

    (parser, Ok(nodes))
}

/// Runs the parser stage on its own thread.
///
/// Parse errors are reported to stderr and the offending token is skipped,
/// so one malformed definition does not stop the stream. The join handle
/// yields the number of errors reported.
pub fn spawn_parser(tokens: Receiver<Token>) -> (Receiver<Node>, JoinHandle<usize>) {
    let (sender, receiver) = mpsc::channel();

    let handle = thread::spawn(move || {
        let mut parser = Parser::new(tokens);
        let mut errors = 0;

        while let Some(node) = parser.next_node() {
            match node {
                Ok(node) => {
                    debug!(name = node.name(), "parsed top-level node");
                    if sender.send(node).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    display_error(&error);
                    errors += 1;
                    parser.advance();
                }
            }
        }

        errors
    });

    (receiver, handle)
}
