//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into top-level AST nodes. It uses a Pratt parser for expressions
//! with operator precedence and handles:
//!
//! - Function definitions, `extern` declarations and operator definitions
//! - Expression parsing (binary and unary ops, calls, if/for/var)
//! - Precedence of user-defined binary operators
//! - Error recovery and reporting for the threaded parser stage
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;

#[cfg(test)]
mod tests;
