//! Shared AST types for the Monkey runtime.
//!
//! The lexer and parser that produce these nodes live outside this workspace;
//! this crate only fixes the contract the evaluator consumes. Every node
//! renders back to canonical source text through [`std::fmt::Display`] and
//! exposes the literal text of its leading token via `token_literal()`.

pub mod ast;

pub use ast::{
    BlockStatement, Expression, ExpressionStatement, FunctionLiteral, Ident, IfExpression,
    InfixOperator, LetStatement, PrefixOperator, Program, ReturnStatement, Statement,
};
