//! AST node types for the Monkey language.
//!
//! Large recursive variants are boxed to keep enum sizes reasonable.
//! Function literals are reference counted so that a function value can
//! hold on to its body without copying the tree each time the literal is
//! evaluated.

use std::fmt;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete Monkey program: a sequence of top-level statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn token_literal(&self) -> String {
        self.statements
            .first()
            .map(Statement::token_literal)
            .unwrap_or_default()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A bound or referenced name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn token_literal(&self) -> String {
        self.name.clone()
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement in a program or block.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let name = expr;`
    Let(LetStatement),
    /// `return expr;`
    Return(ReturnStatement),
    /// A bare expression. Its value is the block's value when it comes last.
    Expression(ExpressionStatement),
}

impl Statement {
    pub fn token_literal(&self) -> String {
        match self {
            Statement::Let(_) => "let".to_string(),
            Statement::Return(_) => "return".to_string(),
            Statement::Expression(stmt) => stmt.expression.token_literal(),
        }
    }

    /// `let name = value;`
    pub fn let_(name: impl Into<String>, value: Expression) -> Self {
        Statement::Let(LetStatement {
            name: Ident::new(name),
            value,
        })
    }

    /// `return value;`
    pub fn return_(value: Expression) -> Self {
        Statement::Return(ReturnStatement { value })
    }

    /// `expression;`
    pub fn expr(expression: Expression) -> Self {
        Statement::Expression(ExpressionStatement { expression })
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let(stmt) => write!(f, "let {} = {};", stmt.name, stmt.value),
            Statement::Return(stmt) => write!(f, "return {};", stmt.value),
            Statement::Expression(stmt) => write!(f, "{}", stmt.expression),
        }
    }
}

/// `let name = value;`
#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    pub name: Ident,
    pub value: Expression,
}

/// `return value;`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Expression,
}

/// A bare expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
}

/// `{ statements... }`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl BlockStatement {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn token_literal(&self) -> String {
        "{".to_string()
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // ── Literals ──
    /// `foo`
    Identifier(Ident),
    /// `42`
    Integer(i64),
    /// `"hello"`
    String(String),
    /// `true` / `false`
    Boolean(bool),
    /// `[expr, ...]`
    Array(Vec<Expression>),
    /// `{key: value, ...}` in source order.
    Hash(Vec<(Expression, Expression)>),
    /// `fn(params) { body }`
    Function(Rc<FunctionLiteral>),

    // ── Operators ──
    /// `!x`, `-x`
    Prefix {
        op: PrefixOperator,
        right: Box<Expression>,
    },
    /// `a + b`, `a == b`, etc.
    Infix {
        left: Box<Expression>,
        op: InfixOperator,
        right: Box<Expression>,
    },

    // ── Control Flow ──
    /// `if (cond) { ... } [else { ... }]`
    If(Box<IfExpression>),

    // ── Calls & Indexing ──
    /// `callee(args...)`
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// `left[index]`
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

impl Expression {
    /// Literal text of the token that starts this expression.
    pub fn token_literal(&self) -> String {
        match self {
            Expression::Identifier(ident) => ident.token_literal(),
            Expression::Integer(n) => n.to_string(),
            Expression::String(s) => s.clone(),
            Expression::Boolean(b) => b.to_string(),
            Expression::Array(_) | Expression::Index { .. } => "[".to_string(),
            Expression::Hash(_) => "{".to_string(),
            Expression::Function(_) => "fn".to_string(),
            Expression::Prefix { op, .. } => op.as_str().to_string(),
            Expression::Infix { op, .. } => op.as_str().to_string(),
            Expression::If(_) => "if".to_string(),
            Expression::Call { .. } => "(".to_string(),
        }
    }

    // ── Constructors ─────────────────────────────────────────────────────

    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Identifier(Ident::new(name))
    }

    pub fn int(value: i64) -> Self {
        Expression::Integer(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::String(value.into())
    }

    pub fn bool(value: bool) -> Self {
        Expression::Boolean(value)
    }

    pub fn array(elements: Vec<Expression>) -> Self {
        Expression::Array(elements)
    }

    pub fn hash(pairs: Vec<(Expression, Expression)>) -> Self {
        Expression::Hash(pairs)
    }

    pub fn prefix(op: PrefixOperator, right: Expression) -> Self {
        Expression::Prefix {
            op,
            right: Box::new(right),
        }
    }

    pub fn infix(left: Expression, op: InfixOperator, right: Expression) -> Self {
        Expression::Infix {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn if_(
        condition: Expression,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    ) -> Self {
        Expression::If(Box::new(IfExpression {
            condition,
            consequence,
            alternative,
        }))
    }

    pub fn function(parameters: &[&str], body: BlockStatement) -> Self {
        Expression::Function(Rc::new(FunctionLiteral {
            parameters: parameters.iter().map(|p| Ident::new(*p)).collect(),
            body,
        }))
    }

    pub fn call(function: Expression, arguments: Vec<Expression>) -> Self {
        Expression::Call {
            function: Box::new(function),
            arguments,
        }
    }

    pub fn index(left: Expression, index: Expression) -> Self {
        Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{ident}"),
            Expression::Integer(n) => write!(f, "{n}"),
            Expression::String(s) => write!(f, "\"{s}\""),
            Expression::Boolean(b) => write!(f, "{b}"),
            Expression::Array(elements) => {
                write!(f, "[")?;
                write_joined(f, elements)?;
                write!(f, "]")
            }
            Expression::Hash(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Expression::Function(func) => write!(f, "{func}"),
            Expression::Prefix { op, right } => write!(f, "({op}{right})"),
            Expression::Infix { left, op, right } => write!(f, "({left} {op} {right})"),
            Expression::If(if_expr) => write!(f, "{if_expr}"),
            Expression::Call {
                function,
                arguments,
            } => {
                write!(f, "{function}(")?;
                write_joined(f, arguments)?;
                write!(f, ")")
            }
            Expression::Index { left, index } => write!(f, "({left}[{index}])"),
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

// ── Control Flow Expressions ──────────────────────────────────────────────────

/// `if (condition) { consequence } [else { alternative }]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub condition: Expression,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
}

impl fmt::Display for IfExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if {} {}", self.condition, self.consequence)?;
        if let Some(alt) = &self.alternative {
            write!(f, " else {alt}")?;
        }
        Ok(())
    }
}

// ── Function Literals ─────────────────────────────────────────────────────────

/// `fn(parameters) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<Ident>,
    pub body: BlockStatement,
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        write_joined(f, &self.parameters)?;
        write!(f, ") {}", self.body)
    }
}

// ── Operators ─────────────────────────────────────────────────────────────────

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixOperator {
    /// `!x`
    Bang,
    /// `-x`
    Minus,
}

impl PrefixOperator {
    /// Returns the operator symbol for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefixOperator::Bang => "!",
            PrefixOperator::Minus => "-",
        }
    }
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infix operators (in precedence order, lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOperator {
    // Equality
    Eq,
    NotEq,
    // Comparison
    Lt,
    Gt,
    // Arithmetic
    Plus,
    Minus,
    Asterisk,
    Slash,
}

impl InfixOperator {
    /// Returns the operator symbol for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfixOperator::Eq => "==",
            InfixOperator::NotEq => "!=",
            InfixOperator::Lt => "<",
            InfixOperator::Gt => ">",
            InfixOperator::Plus => "+",
            InfixOperator::Minus => "-",
            InfixOperator::Asterisk => "*",
            InfixOperator::Slash => "/",
        }
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
