//! Language-level runtime errors.
//!
//! The message text of each variant is stable: hosts and tests match on it.

use thiserror::Error;

use crate::value::Type;

/// A language-level failure: type mismatches, unknown identifiers, bad
/// builtin arguments, unhashable keys, unsupported indexing, wrong arity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Infix operator applied to operands of different types.
    #[error("type mismatch: {left} {op} {right}")]
    TypeMismatch {
        left: Type,
        op: &'static str,
        right: Type,
    },

    /// Infix operator not defined for this (same-typed) operand pair.
    #[error("unknown operator: {left} {op} {right}")]
    UnknownInfixOperator {
        left: Type,
        op: &'static str,
        right: Type,
    },

    /// Prefix operator not defined for this operand type.
    #[error("unknown operator: {op}{operand}")]
    UnknownPrefixOperator { op: &'static str, operand: Type },

    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("unhashable key: {0}")]
    UnhashableKey(Type),

    #[error("index operator not supported: {0}")]
    IndexNotSupported(Type),

    #[error("not a function: {0}")]
    NotAFunction(Type),

    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount { got: usize, want: usize },

    #[error("division by zero")]
    DivisionByZero,

    /// Message reported verbatim by a builtin.
    #[error("{0}")]
    Custom(String),
}

/// Result alias for operations that can raise a [`RuntimeError`].
pub type RuntimeResult<T> = Result<T, RuntimeError>;
