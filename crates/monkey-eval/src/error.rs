//! Early-exit signals for the evaluator.

use monkey_object::{RuntimeError, Value};
use thiserror::Error;

/// Why evaluation of a node stopped before producing a plain value.
///
/// `Return` travels up through nested blocks and expressions until a
/// function call (or the program) unwraps it. `Error` travels all the way to
/// the caller of [`crate::eval`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Signal {
    #[error("return")]
    Return(Value),
    #[error(transparent)]
    Error(#[from] RuntimeError),
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, Signal>;
