//! Operator semantics shared by the evaluator and the VM.
//!
//! Integer arithmetic wraps on overflow and division truncates toward zero.
//! Dividing by zero is a [`RuntimeError::DivisionByZero`].

use std::rc::Rc;

use monkey_ast::{InfixOperator, PrefixOperator};

use crate::error::{RuntimeError, RuntimeResult};
use crate::value::{HashPair, HashPairs, Type, Value, NULL};

/// Truthiness of a condition in `if` and conditional jumps.
///
/// `false` and `null` are falsy, and so are integers that are not positive.
/// Every other value is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Null => false,
        Value::Integer(n) => *n > 0,
        _ => true,
    }
}

/// Apply a prefix operator.
pub fn prefix(op: PrefixOperator, right: &Value) -> RuntimeResult<Value> {
    match op {
        PrefixOperator::Bang => Ok(bang(right)),
        PrefixOperator::Minus => match right {
            Value::Integer(n) => Ok(Value::Integer(n.wrapping_neg())),
            other => Err(RuntimeError::UnknownPrefixOperator {
                op: op.as_str(),
                operand: other.type_name(),
            }),
        },
    }
}

/// `!value`: only `false` and `null` negate to `true`.
pub fn bang(value: &Value) -> Value {
    match value {
        Value::Boolean(b) => Value::from(!b),
        Value::Null => Value::from(true),
        _ => Value::from(false),
    }
}

/// Apply an infix operator.
pub fn infix(op: InfixOperator, left: &Value, right: &Value) -> RuntimeResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => integer_infix(op, *a, *b),
        (Value::String(a), Value::String(b)) => string_infix(op, a, b),
        _ => match op {
            InfixOperator::Eq => Ok(Value::from(left.is_identical(right))),
            InfixOperator::NotEq => Ok(Value::from(!left.is_identical(right))),
            _ if left.type_name() != right.type_name() => Err(RuntimeError::TypeMismatch {
                left: left.type_name(),
                op: op.as_str(),
                right: right.type_name(),
            }),
            _ => Err(RuntimeError::UnknownInfixOperator {
                left: left.type_name(),
                op: op.as_str(),
                right: right.type_name(),
            }),
        },
    }
}

fn integer_infix(op: InfixOperator, a: i64, b: i64) -> RuntimeResult<Value> {
    let value = match op {
        InfixOperator::Plus => Value::Integer(a.wrapping_add(b)),
        InfixOperator::Minus => Value::Integer(a.wrapping_sub(b)),
        InfixOperator::Asterisk => Value::Integer(a.wrapping_mul(b)),
        InfixOperator::Slash => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Value::Integer(a.wrapping_div(b))
        }
        InfixOperator::Lt => Value::from(a < b),
        InfixOperator::Gt => Value::from(a > b),
        InfixOperator::Eq => Value::from(a == b),
        InfixOperator::NotEq => Value::from(a != b),
    };
    Ok(value)
}

fn string_infix(op: InfixOperator, a: &str, b: &str) -> RuntimeResult<Value> {
    match op {
        InfixOperator::Plus => Ok(Value::String(format!("{a}{b}"))),
        InfixOperator::Eq => Ok(Value::from(a == b)),
        InfixOperator::NotEq => Ok(Value::from(a != b)),
        _ => Err(RuntimeError::UnknownInfixOperator {
            left: Type::String,
            op: op.as_str(),
            right: Type::String,
        }),
    }
}

/// `left[index]`.
///
/// Arrays take integer indices and yield `null` outside `[0, len)`. Hashes
/// take any hashable key and yield `null` when it is absent.
pub fn index(left: &Value, index: &Value) -> RuntimeResult<Value> {
    match (left, index) {
        (Value::Array(elements), Value::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .unwrap_or(NULL)),
        (Value::Hash(pairs), key) => {
            let key = key.hash_key()?;
            Ok(pairs.get(&key).map(|pair| pair.value.clone()).unwrap_or(NULL))
        }
        (other, _) => Err(RuntimeError::IndexNotSupported(other.type_name())),
    }
}

/// Build a hash from key/value pairs in source order. Later duplicates
/// overwrite earlier ones.
pub fn build_hash(entries: impl IntoIterator<Item = (Value, Value)>) -> RuntimeResult<Value> {
    let mut pairs = HashPairs::new();
    for (key, value) in entries {
        let hashed = key.hash_key()?;
        pairs.insert(hashed, HashPair { key, value });
    }
    Ok(Value::Hash(Rc::new(pairs)))
}
