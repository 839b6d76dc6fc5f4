//! Monkey object model: the runtime values both execution engines share.
//!
//! - [`Value`] is the closed set of runtime values, with [`HashKey`] as the
//!   projection used for hash-map keys.
//! - [`Env`] is a chained lexical scope, shared by closures.
//! - [`builtins`] is the fixed table of native functions.
//! - [`ops`] holds operator semantics, so the tree-walking evaluator and the
//!   bytecode VM produce identical results and error text.

pub mod builtins;
pub mod env;
pub mod error;
pub mod json;
pub mod ops;
pub mod value;

pub use builtins::{Builtin, BuiltinFn};
pub use env::Env;
pub use error::{RuntimeError, RuntimeResult};
pub use json::to_json;
pub use value::{Function, HashKey, HashPair, HashPairs, Type, Value, FALSE, NULL, TRUE};
