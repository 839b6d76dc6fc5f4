//! Runtime values.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use monkey_ast::FunctionLiteral;

use crate::builtins::Builtin;
use crate::env::Env;
use crate::error::{RuntimeError, RuntimeResult};

/// The `true` singleton.
pub const TRUE: Value = Value::Boolean(true);
/// The `false` singleton.
pub const FALSE: Value = Value::Boolean(false);
/// The `null` singleton.
pub const NULL: Value = Value::Null;

// ══════════════════════════════════════════════════════════════════════════════
// Type tags
// ══════════════════════════════════════════════════════════════════════════════

/// The type tag of a [`Value`], rendered the way error messages spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Integer,
    Boolean,
    String,
    Null,
    Array,
    Hash,
    Function,
    Builtin,
    Error,
}

impl Type {
    pub fn as_str(&self) -> &'static str {
        match self {
            Type::Integer => "INTEGER",
            Type::Boolean => "BOOLEAN",
            Type::String => "STRING",
            Type::Null => "NULL",
            Type::Array => "ARRAY",
            Type::Hash => "HASH",
            Type::Function => "FUNCTION",
            Type::Builtin => "BUILTIN",
            Type::Error => "ERROR",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Value
// ══════════════════════════════════════════════════════════════════════════════

/// A Monkey runtime value.
///
/// Collections and functions are reference counted: cloning a `Value` never
/// copies an array, a hash, or a closure environment. Builtins that "modify"
/// an array build a new one.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Array(Rc<Vec<Value>>),
    Hash(Rc<HashPairs>),
    Function(Rc<Function>),
    Builtin(Builtin),
    /// A first-class error. Evaluation stops at the first one produced.
    Error(String),
}

impl Value {
    /// Wrap `elements` in a fresh array allocation.
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(elements))
    }

    /// A first-class error carrying `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(message.into())
    }

    /// The type tag used in error messages.
    pub fn type_name(&self) -> Type {
        match self {
            Value::Integer(_) => Type::Integer,
            Value::Boolean(_) => Type::Boolean,
            Value::String(_) => Type::String,
            Value::Null => Type::Null,
            Value::Array(_) => Type::Array,
            Value::Hash(_) => Type::Hash,
            Value::Function(_) => Type::Function,
            Value::Builtin(_) => Type::Builtin,
            Value::Error(_) => Type::Error,
        }
    }

    /// Whether this is a [`Value::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Identity comparison, the semantics of `==` for non-scalar operands.
    ///
    /// `true`, `false` and `null` are singletons, so comparing the variant is
    /// comparing identity. Heap values are identical only if they share the
    /// same allocation. Integers and strings have no identity of their own and
    /// compare by content.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Hash(a), Value::Hash(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }

    /// Project a hashable value onto its [`HashKey`].
    pub fn hash_key(&self) -> RuntimeResult<HashKey> {
        match self {
            Value::Integer(n) => Ok(HashKey::Integer(*n)),
            Value::Boolean(b) => Ok(HashKey::Boolean(*b)),
            Value::String(s) => Ok(HashKey::String(s.clone())),
            other => Err(RuntimeError::UnhashableKey(other.type_name())),
        }
    }

    /// Convert an error value into `Err`, passing every other value through.
    pub fn into_result(self) -> RuntimeResult<Value> {
        match self {
            Value::Error(message) => Err(RuntimeError::Custom(message)),
            other => Ok(other),
        }
    }
}

impl From<bool> for Value {
    /// Always one of the two boolean singletons.
    fn from(b: bool) -> Self {
        if b {
            TRUE
        } else {
            FALSE
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<RuntimeError> for Value {
    fn from(err: RuntimeError) -> Self {
        Value::Error(err.to_string())
    }
}

/// Host-level structural equality, used by tests and hosts.
///
/// This is not the language's `==`, which is [`crate::ops::infix`]: arrays
/// compare by content here but by identity in Monkey code.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
            Value::Null => f.write_str("null"),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, el) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{el}")?;
                }
                write!(f, "]")
            }
            Value::Hash(pairs) => {
                write!(f, "{{")?;
                for (i, pair) in pairs.values().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                write!(f, "}}")
            }
            Value::Function(func) => write!(f, "{func}"),
            Value::Builtin(_) => f.write_str("builtin function"),
            Value::Error(message) => write!(f, "ERROR: {message}"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Hashes
// ══════════════════════════════════════════════════════════════════════════════

/// Hash-map key: the type tag plus the underlying scalar.
///
/// Ordered so that hash iteration is deterministic; the ordering itself is
/// not part of the language.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(String),
}

/// A stored hash entry: the original key value alongside the value.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

/// The contents of a hash value.
pub type HashPairs = BTreeMap<HashKey, HashPair>;

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

/// A closure: a function literal plus the environment it was defined in.
pub struct Function {
    pub literal: Rc<FunctionLiteral>,
    pub env: Env,
}

impl Function {
    /// Close `literal` over the scope it is evaluated in.
    pub fn new(literal: Rc<FunctionLiteral>, env: Env) -> Self {
        Self { literal, env }
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.literal.parameters.len()
    }
}

// Environments can contain the function itself (recursive bindings), so the
// captured scope is left out.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("literal", &self.literal.to_string())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        for (i, param) in self.literal.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") {{\n{}\n}}", self.literal.body)
    }
}
