//! Monkey tree-walking evaluator.
//!
//! Computes a [`Value`] for every AST node, using an [`Env`] chain for
//! bindings and the builtin registry for native calls. Language-level
//! failures come back as [`Value::Error`]; nothing here panics on bad input.

mod error;
mod evaluator;

pub use error::{EvalResult, Signal};
pub use evaluator::{eval, Evaluator, Node};
pub use monkey_object::{Env, Value};
