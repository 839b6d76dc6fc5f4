//! Core expression and statement evaluator.

use std::rc::Rc;

use monkey_ast::{BlockStatement, Expression, IfExpression, Program, Statement};
use monkey_object::{
    builtins, ops, Env, Function, HashPair, HashPairs, RuntimeError, Value, NULL,
};
use tracing::debug;

use crate::error::{EvalResult, Signal};

/// Any AST node the evaluator accepts as an entry point.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Statement(&'a Statement),
    Block(&'a BlockStatement),
    Expression(&'a Expression),
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(program: &'a Program) -> Self {
        Node::Program(program)
    }
}

impl<'a> From<&'a Statement> for Node<'a> {
    fn from(stmt: &'a Statement) -> Self {
        Node::Statement(stmt)
    }
}

impl<'a> From<&'a BlockStatement> for Node<'a> {
    fn from(block: &'a BlockStatement) -> Self {
        Node::Block(block)
    }
}

impl<'a> From<&'a Expression> for Node<'a> {
    fn from(expr: &'a Expression) -> Self {
        Node::Expression(expr)
    }
}

/// Evaluate a node in `env`.
///
/// A `return` reaching this level yields its value. Errors come back as
/// [`Value::Error`] carrying the error's message.
pub fn eval<'a>(node: impl Into<Node<'a>>, env: &Env) -> Value {
    let result = match node.into() {
        Node::Program(program) => eval_statements(&program.statements, env),
        Node::Statement(stmt) => eval_statement(stmt, env),
        Node::Block(block) => eval_block(block, env),
        Node::Expression(expr) => eval_expr(expr, env),
    };
    match result {
        Ok(value) | Err(Signal::Return(value)) => value,
        Err(Signal::Error(err)) => {
            debug!(error = %err, "evaluation failed");
            Value::from(err)
        }
    }
}

/// An evaluator bound to one long-lived environment.
///
/// Successive programs see each other's `let` bindings, the way a REPL
/// session does.
#[derive(Debug, Default)]
pub struct Evaluator {
    env: Env,
}

impl Evaluator {
    /// Create an evaluator with an empty global environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator over an existing environment.
    pub fn with_env(env: Env) -> Self {
        Self { env }
    }

    /// The session's global environment.
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Evaluate a whole program in the session environment.
    pub fn eval_program(&self, program: &Program) -> Value {
        eval(program, &self.env)
    }

    pub fn eval_expression(&self, expr: &Expression) -> Value {
        eval(expr, &self.env)
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════

/// Evaluate statements in order; the last one's value is the result.
fn eval_statements(stmts: &[Statement], env: &Env) -> EvalResult<Value> {
    let mut last = NULL;
    for stmt in stmts {
        last = eval_statement(stmt, env)?;
    }
    Ok(last)
}

fn eval_block(block: &BlockStatement, env: &Env) -> EvalResult<Value> {
    eval_statements(&block.statements, env)
}

fn eval_statement(stmt: &Statement, env: &Env) -> EvalResult<Value> {
    match stmt {
        Statement::Expression(stmt) => eval_expr(&stmt.expression, env),
        Statement::Let(stmt) => {
            let value = eval_expr(&stmt.value, env)?;
            env.define(stmt.name.name.clone(), value);
            Ok(NULL)
        }
        Statement::Return(stmt) => {
            let value = eval_expr(&stmt.value, env)?;
            Err(Signal::Return(value))
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════

fn eval_expr(expr: &Expression, env: &Env) -> EvalResult<Value> {
    match expr {
        Expression::Integer(n) => Ok(Value::Integer(*n)),
        Expression::String(s) => Ok(Value::String(s.clone())),
        Expression::Boolean(b) => Ok(Value::from(*b)),
        Expression::Array(elements) => {
            let values = eval_expressions(elements, env)?;
            Ok(Value::array(values))
        }
        Expression::Hash(pairs) => eval_hash_literal(pairs, env),
        Expression::Function(literal) => Ok(Value::Function(Rc::new(Function::new(
            Rc::clone(literal),
            env.clone(),
        )))),

        Expression::Identifier(ident) => eval_identifier(&ident.name, env),

        Expression::Prefix { op, right } => {
            let right = eval_expr(right, env)?;
            Ok(ops::prefix(*op, &right)?)
        }
        Expression::Infix { left, op, right } => {
            let left = eval_expr(left, env)?;
            let right = eval_expr(right, env)?;
            Ok(ops::infix(*op, &left, &right)?)
        }

        Expression::If(if_expr) => eval_if_expr(if_expr, env),

        Expression::Call {
            function,
            arguments,
        } => {
            let callee = eval_expr(function, env)?;
            let args = eval_expressions(arguments, env)?;
            apply_function(&callee, args)
        }
        Expression::Index { left, index } => {
            let left = eval_expr(left, env)?;
            let index = eval_expr(index, env)?;
            Ok(ops::index(&left, &index)?)
        }
    }
}

/// Evaluate left to right, stopping at the first error.
fn eval_expressions(exprs: &[Expression], env: &Env) -> EvalResult<Vec<Value>> {
    let mut values = Vec::with_capacity(exprs.len());
    for expr in exprs {
        values.push(eval_expr(expr, env)?);
    }
    Ok(values)
}

// ── Literals & Identifiers ───────────────────────────────────────────────

fn eval_hash_literal(pairs: &[(Expression, Expression)], env: &Env) -> EvalResult<Value> {
    let mut hash = HashPairs::new();
    for (key_expr, value_expr) in pairs {
        let key = eval_expr(key_expr, env)?;
        let hashed = key.hash_key()?;
        let value = eval_expr(value_expr, env)?;
        hash.insert(hashed, HashPair { key, value });
    }
    Ok(Value::Hash(Rc::new(hash)))
}

/// User bindings shadow builtins.
fn eval_identifier(name: &str, env: &Env) -> EvalResult<Value> {
    if let Some(value) = env.lookup(name) {
        return Ok(value.into_result()?);
    }
    builtins::lookup(name)
        .map(Value::Builtin)
        .ok_or_else(|| RuntimeError::IdentifierNotFound(name.to_string()).into())
}

// ── Control Flow ─────────────────────────────────────────────────────────

fn eval_if_expr(if_expr: &IfExpression, env: &Env) -> EvalResult<Value> {
    let condition = eval_expr(&if_expr.condition, env)?;
    if ops::is_truthy(&condition) {
        eval_block(&if_expr.consequence, env)
    } else if let Some(alternative) = &if_expr.alternative {
        eval_block(alternative, env)
    } else {
        Ok(NULL)
    }
}

// ── Calls ────────────────────────────────────────────────────────────────

fn apply_function(callee: &Value, args: Vec<Value>) -> EvalResult<Value> {
    match callee {
        Value::Function(func) => call_function(func, args),
        Value::Builtin(builtin) => Ok(builtin.call(&args).into_result()?),
        other => Err(RuntimeError::NotAFunction(other.type_name()).into()),
    }
}

/// Run a closure body in a fresh scope enclosed by its captured environment.
///
/// This is the only place a `return` is stripped back to a plain value.
#[tracing::instrument(level = "debug", skip_all, fields(arity = func.arity()))]
fn call_function(func: &Function, args: Vec<Value>) -> EvalResult<Value> {
    if args.len() != func.arity() {
        return Err(RuntimeError::WrongArgumentCount {
            got: args.len(),
            want: func.arity(),
        }
        .into());
    }

    let call_env = Env::new_enclosed(&func.env);
    for (param, arg) in func.literal.parameters.iter().zip(args) {
        call_env.define(param.name.clone(), arg);
    }

    match eval_block(&func.literal.body, &call_env) {
        Err(Signal::Return(value)) => Ok(value),
        other => other,
    }
}
