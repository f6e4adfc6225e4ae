/// AST (Abstract Syntax Tree) module
///
/// The tree is a closed set of sum types: `Expr` for expressions and `Node`
/// for top-level units. Nodes are immutable once built by the parser.
pub mod ast;
