//! Chained variable environment for the Monkey evaluator.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// A single scope: local bindings plus an optional enclosing scope.
///
/// Lookups walk outward through `outer`; `define` only ever touches the
/// local bindings.
#[derive(Default)]
pub(crate) struct Environment {
    store: HashMap<String, Value>,
    outer: Option<Env>,
}

impl Environment {
    pub(crate) fn get(&self, name: &str) -> Option<Value> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref().and_then(|outer| outer.lookup(name)),
        }
    }

    pub(crate) fn set(&mut self, name: impl Into<String>, value: Value) {
        self.store.insert(name.into(), value);
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.store.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .field("outer", &self.outer.is_some())
            .finish()
    }
}

/// Shared handle to one scope of the environment chain.
///
/// A closure and every call frame it spawns hold handles to the same scope,
/// and sibling closures may alias one enclosing scope. Scopes live as long
/// as any handle does.
#[derive(Clone, Default)]
pub struct Env(Rc<RefCell<Environment>>);

impl Env {
    /// Create a fresh top-level environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope whose parent is `outer`.
    pub fn new_enclosed(outer: &Env) -> Self {
        Env(Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(outer.clone()),
        })))
    }

    /// Insert or overwrite a binding in this scope.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().set(name, value);
    }

    /// Look up a name here, then in each enclosing scope.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name)
    }

    /// Whether both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Env) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(env) => env.fmt(f),
            Err(_) => f.write_str("Environment { <borrowed> }"),
        }
    }
}
