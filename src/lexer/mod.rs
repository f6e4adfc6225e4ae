//! Lexical analysis module for the compiler.
//!
//! This module contains the lexer (tokenizer) that converts source code
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using regex patterns
//! - Recognition of keywords, identifiers, numbers and operator characters
//! - Token position tracking for error reporting
//! - Comments and whitespace handling
//! - The threaded lexer stage feeding the parser

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
