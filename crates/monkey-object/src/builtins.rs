//! Native functions callable from Monkey code.
//!
//! Every builtin validates its own arguments and reports mistakes as a
//! [`Value::Error`]; none of them panic on bad input.

use std::fmt;

use crate::value::{Value, NULL};

/// Signature shared by all native functions.
pub type BuiltinFn = fn(&[Value]) -> Value;

/// A named native function.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Builtin {
    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// The registry, in a fixed order.
pub const BUILTINS: &[Builtin] = &[
    Builtin { name: "len", func: len },
    Builtin { name: "first", func: first },
    Builtin { name: "last", func: last },
    Builtin { name: "rest", func: rest },
    Builtin { name: "push", func: push },
    Builtin { name: "puts", func: puts },
];

/// Find a builtin by name.
pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.iter().find(|b| b.name == name).copied()
}

fn wrong_arity(got: usize, want: &str) -> Value {
    Value::error(format!("wrong number of arguments. got={got}, want={want}"))
}

/// Length of a string in bytes, or of an array in elements.
fn len(args: &[Value]) -> Value {
    let [arg] = args else {
        return wrong_arity(args.len(), "1");
    };
    match arg {
        Value::String(s) => Value::Integer(s.len() as i64),
        Value::Array(elements) => Value::Integer(elements.len() as i64),
        other => Value::error(format!(
            "argument to `len` not supported. got={}",
            other.type_name()
        )),
    }
}

fn array_arg<'a>(name: &str, args: &'a [Value]) -> Result<&'a [Value], Value> {
    let [arg] = args else {
        return Err(wrong_arity(args.len(), "1"));
    };
    match arg {
        Value::Array(elements) => Ok(elements.as_slice()),
        other => Err(Value::error(format!(
            "'{name}' only accepts an array as an argument. got={}",
            other.type_name()
        ))),
    }
}

fn first(args: &[Value]) -> Value {
    match array_arg("first", args) {
        Ok(elements) => elements.first().cloned().unwrap_or(NULL),
        Err(err) => err,
    }
}

fn last(args: &[Value]) -> Value {
    match array_arg("last", args) {
        Ok(elements) => elements.last().cloned().unwrap_or(NULL),
        Err(err) => err,
    }
}

/// Everything after the first element, as a new array.
fn rest(args: &[Value]) -> Value {
    match array_arg("rest", args) {
        Ok([]) => NULL,
        Ok([_, tail @ ..]) => Value::array(tail.to_vec()),
        Err(err) => err,
    }
}

/// A new array with the remaining arguments appended; the input is untouched.
fn push(args: &[Value]) -> Value {
    if args.len() < 2 {
        return wrong_arity(args.len(), ">2");
    }
    match &args[0] {
        Value::Array(elements) => {
            let mut out = Vec::with_capacity(elements.len() + args.len() - 1);
            out.extend(elements.iter().cloned());
            out.extend(args[1..].iter().cloned());
            Value::array(out)
        }
        other => Value::error(format!(
            "the first argument needs to be of type ARRAY. got={}",
            other.type_name()
        )),
    }
}

fn puts(args: &[Value]) -> Value {
    for arg in args {
        println!("{arg}");
    }
    NULL
}
