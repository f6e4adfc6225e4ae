//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Error structures with optional source position information
//! - Specific error variants for lexing, parsing, code generation and emission
//! - Error formatting and display functionality
//! - Helpful error messages and suggestions

pub mod errors;
