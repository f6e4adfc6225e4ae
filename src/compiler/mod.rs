//! Code generation module for the compiler.
//!
//! This module contains the LLVM-based code generator that transforms
//! the AST into LLVM IR. It handles:
//!
//! - Compilation of expressions and function definitions
//! - Scoping of loop counters, `var` bindings and parameters
//! - Per-function optimization
//! - Native target setup, JIT evaluation and object emission

pub mod compiler;
pub mod expr;
pub mod function;
pub mod optimizer;
pub mod scope;
pub mod target;
