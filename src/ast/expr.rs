//! SQL expression types
//!
//! This module defines all SQL expression types that can appear in queries.
//! Expressions are the building blocks of SQL: columns, literals, operators,
//! predicates, function calls, etc.
//!
//! # Precedence folding
//!
//! The fluent combinators (`plus`, `multiply`, `and`, `or`, …) can be chained
//! in any order and still produce a tree that follows standard operator
//! precedence:
//!
//! - appending a tighter arithmetic operator to an arithmetic node folds the
//!   new operand into the right-hand side: `a.plus(b).multiply(c)` is
//!   `a + (b * c)`;
//! - `and` applied to an OR node binds to the last OR operand only:
//!   `x.or(y).and(z)` is `x or (y and z)`;
//! - `or` applied to anything that is not already an OR node wraps it:
//!   `x.and(y).or(z)` is `(x and y) or z`.
//!
//! Use [`Expr::nested`] to pin a grouping; folding never reaches inside it.

use super::literal::Literal;
use super::params::Placeholder;
use super::stmt::Query;
use super::table::Table;
use super::types::SqlType;
use super::window::Window;
use crate::error::{Error, Result};

/// An SQL identifier (table name, column name, alias, etc.)
///
/// Quoting and case conversion are decided by the render configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(pub String);

impl Ident {
    /// Create a new identifier from any string-like type
    #[inline]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Create an identifier, rejecting empty names
    pub fn try_new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(Error::null_argument("identifier"));
        }
        Ok(Self(s))
    }

    /// Get the identifier as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a column, optionally owned by a table
///
/// The table is only consulted for its alias at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub table: Option<Table>,
    pub column: Ident,
}

impl ColumnRef {
    pub fn new(column: impl Into<Ident>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    pub fn of(table: &Table, column: impl Into<Ident>) -> Self {
        Self {
            table: Some(table.clone()),
            column: column.into(),
        }
    }
}

// =============================================================================
// Operators
// =============================================================================

/// Arithmetic and string concatenation operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperator {
    Multiply,
    Divide,
    Modulo,
    Plus,
    Minus,
    Concat,
}

impl ArithmeticOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Concat => "||",
        }
    }

    /// Precedence tier; a lower tier binds tighter
    pub fn tier(&self) -> u8 {
        match self {
            Self::Multiply | Self::Divide | Self::Modulo => 1,
            Self::Plus | Self::Minus | Self::Concat => 2,
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl ComparisonOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// Logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Quantifiers applied to a sub-query operand of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    All,
    Any,
    Some,
}

impl Quantifier {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
            Self::Some => "some",
        }
    }
}

/// Expected operand count of an [`Operator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

/// Every operator that can be applied dynamically through [`Expr::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Arithmetic(ArithmeticOperator),
    Comparison(ComparisonOperator),
    Logical(LogicalOperator),
    Not,
    IsNull,
    IsNotNull,
    Exists,
    Quantified(Quantifier),
    Like,
    NotLike,
}

impl Operator {
    /// Map SQL operator text onto an operator (case-insensitive)
    pub fn from_keyword(s: &str) -> Option<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let op = match normalized.to_lowercase().as_str() {
            "*" => Self::Arithmetic(ArithmeticOperator::Multiply),
            "/" => Self::Arithmetic(ArithmeticOperator::Divide),
            "%" => Self::Arithmetic(ArithmeticOperator::Modulo),
            "+" => Self::Arithmetic(ArithmeticOperator::Plus),
            "-" => Self::Arithmetic(ArithmeticOperator::Minus),
            "||" => Self::Arithmetic(ArithmeticOperator::Concat),
            "=" => Self::Comparison(ComparisonOperator::Eq),
            "<>" | "!=" => Self::Comparison(ComparisonOperator::NotEq),
            "<" => Self::Comparison(ComparisonOperator::Lt),
            "<=" => Self::Comparison(ComparisonOperator::LtEq),
            ">" => Self::Comparison(ComparisonOperator::Gt),
            ">=" => Self::Comparison(ComparisonOperator::GtEq),
            "and" => Self::Logical(LogicalOperator::And),
            "or" => Self::Logical(LogicalOperator::Or),
            "not" => Self::Not,
            "is null" => Self::IsNull,
            "is not null" => Self::IsNotNull,
            "exists" => Self::Exists,
            "all" => Self::Quantified(Quantifier::All),
            "any" => Self::Quantified(Quantifier::Any),
            "some" => Self::Quantified(Quantifier::Some),
            "like" => Self::Like,
            "not like" => Self::NotLike,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Arithmetic(op) => op.as_sql(),
            Self::Comparison(op) => op.as_sql(),
            Self::Logical(op) => op.as_sql(),
            Self::Not => "not",
            Self::IsNull => "is null",
            Self::IsNotNull => "is not null",
            Self::Exists => "exists",
            Self::Quantified(q) => q.as_sql(),
            Self::Like => "like",
            Self::NotLike => "not like",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Self::Arithmetic(_) | Self::Comparison(_) | Self::Like | Self::NotLike => {
                Arity::Exactly(2)
            }
            Self::Logical(_) => Arity::AtLeast(1),
            Self::Not | Self::IsNull | Self::IsNotNull | Self::Exists | Self::Quantified(_) => {
                Arity::Exactly(1)
            }
        }
    }
}

// =============================================================================
// Composite nodes
// =============================================================================

/// Binary arithmetic: `left op right`
#[derive(Debug, Clone, PartialEq)]
pub struct ArithmeticExpr {
    pub left: Box<Expr>,
    pub op: ArithmeticOperator,
    pub right: Box<Expr>,
}

/// A run of operands joined by the same logical connective
///
/// The operand list is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpr {
    op: LogicalOperator,
    operands: Vec<Expr>,
}

impl LogicalExpr {
    pub fn new(op: LogicalOperator, operands: Vec<Expr>) -> Result<Self> {
        if operands.is_empty() {
            return Err(Error::empty_operands(format!(
                "{} requires at least one operand",
                op.as_sql()
            )));
        }
        Ok(Self { op, operands })
    }

    pub fn op(&self) -> LogicalOperator {
        self.op
    }

    pub fn operands(&self) -> &[Expr] {
        &self.operands
    }

    /// Append an operand, flattening it if it uses the same connective
    pub fn push(&mut self, operand: Expr) {
        match operand {
            Expr::Logical(inner) if inner.op == self.op => self.operands.extend(inner.operands),
            other => self.operands.push(other),
        }
    }

    /// Collapse redundant single-operand nesting
    ///
    /// A node holding exactly one operand is replaced by that operand, so a
    /// WHERE list that holds one already-combined condition renders as that
    /// condition.
    pub fn reduce(mut self) -> Expr {
        if self.operands.len() == 1 {
            let sole = self.operands.remove(0);
            match sole {
                Expr::Logical(inner) => inner.reduce(),
                other => other,
            }
        } else {
            Expr::Logical(self)
        }
    }
}

/// CASE expression
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpr {
    /// CASE <operand> (simple case) vs CASE WHEN (searched case)
    pub operand: Option<Box<Expr>>,
    /// WHEN ... THEN ... pairs, in order
    pub when_clauses: Vec<(Expr, Expr)>,
    /// ELSE clause
    pub else_clause: Option<Box<Expr>>,
}

impl CaseExpr {
    /// Create a searched CASE expression (CASE WHEN ... THEN ...)
    pub fn searched(when_clauses: Vec<(Expr, Expr)>, else_clause: Option<Expr>) -> Result<Self> {
        if when_clauses.is_empty() {
            return Err(Error::null_argument("case requires at least one when"));
        }
        Ok(Self {
            operand: None,
            when_clauses,
            else_clause: else_clause.map(Box::new),
        })
    }

    /// Create a simple CASE expression (CASE x WHEN ... THEN ...)
    pub fn simple(
        operand: impl IntoExpr,
        when_clauses: Vec<(Expr, Expr)>,
        else_clause: Option<Expr>,
    ) -> Result<Self> {
        let mut case = Self::searched(when_clauses, else_clause)?;
        case.operand = Some(Box::new(operand.into_expr()));
        Ok(case)
    }

    /// Append a WHEN ... THEN ... pair
    pub fn when(mut self, condition: impl IntoExpr, result: impl IntoExpr) -> Self {
        self.when_clauses
            .push((condition.into_expr(), result.into_expr()));
        self
    }

    /// Set the ELSE branch
    pub fn otherwise(mut self, result: impl IntoExpr) -> Self {
        self.else_clause = Some(Box::new(result.into_expr()));
        self
    }
}

/// A function call expression
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub schema: Option<Ident>,
    pub name: Ident,
    pub args: Vec<Expr>,
    /// Render `name(distinct ...)`
    pub distinct: bool,
}

impl FunctionCall {
    pub fn new(name: impl Into<Ident>, args: Vec<Expr>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            args,
            distinct: false,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<Ident>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// `count(*)`
    pub fn count_star() -> Self {
        Self::new("count", vec![Expr::Wildcard(None)])
    }

    /// Turn this call into a window function over `window`
    pub fn over(self, window: &Window) -> Expr {
        Expr::WindowFunction {
            function: self,
            window: window.clone(),
        }
    }
}

impl From<FunctionCall> for Expr {
    fn from(call: FunctionCall) -> Self {
        Self::Function(call)
    }
}

/// ORDER BY expression component
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub direction: Option<OrderDirection>,
    pub nulls: Option<NullsOrder>,
}

impl OrderByExpr {
    pub fn new(expr: impl IntoExpr) -> Self {
        Self {
            expr: expr.into_expr(),
            direction: None,
            nulls: None,
        }
    }

    pub fn asc(expr: impl IntoExpr) -> Self {
        Self {
            direction: Some(OrderDirection::Asc),
            ..Self::new(expr)
        }
    }

    pub fn desc(expr: impl IntoExpr) -> Self {
        Self {
            direction: Some(OrderDirection::Desc),
            ..Self::new(expr)
        }
    }

    pub fn with_nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

/// ORDER BY direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// NULLS FIRST/LAST in ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

impl NullsOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::First => "nulls first",
            Self::Last => "nulls last",
        }
    }
}

// =============================================================================
// Expression
// =============================================================================

/// The main expression enum encompassing all SQL expression types
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value, possibly NULL
    Literal(Literal),

    /// Bind parameter marker
    Placeholder(Placeholder),

    /// Column reference: alias.column or just column
    Column(ColumnRef),

    /// `*` or `alias.*`
    Wildcard(Option<Table>),

    /// Arithmetic: left op right
    Arithmetic(ArithmeticExpr),

    /// Comparison: left op right
    Comparison {
        left: Box<Expr>,
        op: ComparisonOperator,
        right: Box<Expr>,
    },

    /// Quantified sub-query operand: ANY (SELECT ...)
    Quantified {
        quantifier: Quantifier,
        query: Box<Query>,
    },

    /// AND / OR over one or more operands
    Logical(LogicalExpr),

    /// NOT expr
    Not(Box<Expr>),

    /// expr BETWEEN low AND high
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// expr IN (values)
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// expr IN (SELECT ...)
    InQuery {
        expr: Box<Expr>,
        query: Box<Query>,
        negated: bool,
    },

    /// expr LIKE pattern [ESCAPE c]
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        escape: Option<char>,
        negated: bool,
    },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// EXISTS (subquery)
    Exists { query: Box<Query>, negated: bool },

    /// CASE expression
    Case(CaseExpr),

    /// CAST(expr AS type)
    Cast {
        expr: Box<Expr>,
        target_type: SqlType,
    },

    /// expr COLLATE collation
    Collate { expr: Box<Expr>, collation: Ident },

    /// Function call
    Function(FunctionCall),

    /// function(...) OVER window
    WindowFunction {
        function: FunctionCall,
        window: Window,
    },

    /// Scalar subquery: (SELECT ...)
    Subquery(Box<Query>),

    /// Explicit parentheses; opaque to precedence folding
    Grouping(Box<Expr>),
}

/// Conversion into an expression
///
/// Implemented for built expressions and for every host value that has a
/// [`Literal`] representation, so combinators accept `5`, `"text"` or another
/// expression interchangeably.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for &Expr {
    fn into_expr(self) -> Expr {
        self.clone()
    }
}

impl IntoExpr for Literal {
    fn into_expr(self) -> Expr {
        Expr::Literal(self)
    }
}

impl IntoExpr for Placeholder {
    fn into_expr(self) -> Expr {
        Expr::Placeholder(self)
    }
}

impl IntoExpr for &Placeholder {
    fn into_expr(self) -> Expr {
        Expr::Placeholder(self.clone())
    }
}

impl IntoExpr for ColumnRef {
    fn into_expr(self) -> Expr {
        Expr::Column(self)
    }
}

impl IntoExpr for FunctionCall {
    fn into_expr(self) -> Expr {
        Expr::Function(self)
    }
}

impl IntoExpr for CaseExpr {
    fn into_expr(self) -> Expr {
        Expr::Case(self)
    }
}

macro_rules! literal_into_expr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::Literal(Literal::from(self))
                }
            }
        )*
    };
}

literal_into_expr!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    char,
    &str,
    String,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    serde_json::Value,
);

impl<T: Into<Literal>> IntoExpr for Option<T> {
    fn into_expr(self) -> Expr {
        Expr::Literal(Literal::from(self))
    }
}

impl From<Literal> for Expr {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

impl From<Placeholder> for Expr {
    fn from(p: Placeholder) -> Self {
        Self::Placeholder(p)
    }
}

impl From<CaseExpr> for Expr {
    fn from(case: CaseExpr) -> Self {
        Self::Case(case)
    }
}

impl Expr {
    // Convenience constructors

    /// Create an unqualified column reference
    pub fn column(name: impl Into<Ident>) -> Self {
        Self::Column(ColumnRef::new(name))
    }

    /// Create a literal from any host value
    pub fn literal(value: impl Into<Literal>) -> Self {
        Self::Literal(value.into())
    }

    /// Create a NULL literal
    pub fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Create a boolean literal
    pub fn bool(b: bool) -> Self {
        Self::Literal(Literal::Bool(b))
    }

    /// Create an integer literal
    pub fn int(n: i64) -> Self {
        Self::Literal(Literal::Integer(n))
    }

    /// Create a string literal
    pub fn string(s: impl Into<String>) -> Self {
        Self::Literal(Literal::String(s.into()))
    }

    /// Create a bind placeholder with an initial value
    pub fn placeholder(value: impl Into<Literal>) -> Self {
        Self::Placeholder(Placeholder::new(value))
    }

    /// `*`
    pub fn wildcard() -> Self {
        Self::Wildcard(None)
    }

    /// Create a function call
    pub fn function(name: impl Into<Ident>, args: Vec<Expr>) -> Self {
        Self::Function(FunctionCall::new(name, args))
    }

    /// Create a NOT expression
    pub fn not(expr: impl IntoExpr) -> Self {
        Self::Not(Box::new(expr.into_expr()))
    }

    /// EXISTS (query)
    pub fn exists(query: impl Into<Query>) -> Self {
        Self::Exists {
            query: Box::new(query.into()),
            negated: false,
        }
    }

    /// NOT EXISTS (query)
    pub fn not_exists(query: impl Into<Query>) -> Self {
        Self::Exists {
            query: Box::new(query.into()),
            negated: true,
        }
    }

    /// ALL (query), for use as a comparison operand
    pub fn all(query: impl Into<Query>) -> Self {
        Self::quantified(Quantifier::All, query)
    }

    /// ANY (query), for use as a comparison operand
    pub fn any(query: impl Into<Query>) -> Self {
        Self::quantified(Quantifier::Any, query)
    }

    /// SOME (query), for use as a comparison operand
    pub fn some(query: impl Into<Query>) -> Self {
        Self::quantified(Quantifier::Some, query)
    }

    fn quantified(quantifier: Quantifier, query: impl Into<Query>) -> Self {
        Self::Quantified {
            quantifier,
            query: Box::new(query.into()),
        }
    }

    /// Scalar subquery
    pub fn subquery(query: impl Into<Query>) -> Self {
        Self::Subquery(Box::new(query.into()))
    }

    /// Combine a list of conditions with AND
    pub fn and_all(operands: Vec<Expr>) -> Result<Self> {
        LogicalExpr::new(LogicalOperator::And, operands).map(Self::Logical)
    }

    /// Combine a list of conditions with OR
    pub fn or_all(operands: Vec<Expr>) -> Result<Self> {
        LogicalExpr::new(LogicalOperator::Or, operands).map(Self::Logical)
    }

    /// Apply an operator to a dynamic operand list, checking its arity
    pub fn apply(op: Operator, operands: Vec<Expr>) -> Result<Self> {
        let found = operands.len();
        match op.arity() {
            Arity::Exactly(n) if found != n => return Err(Error::arity(op.as_sql(), n, found)),
            Arity::AtLeast(n) if found < n => {
                return Err(Error::null_argument(format!(
                    "operand for `{}`",
                    op.as_sql()
                )))
            }
            _ => {}
        }

        let mut operands = operands.into_iter();
        let mut take = || {
            operands
                .next()
                .ok_or_else(|| Error::null_argument(format!("operand for `{}`", op.as_sql())))
        };

        let expr = match op {
            Operator::Arithmetic(op) => Self::arithmetic(take()?, op, take()?),
            Operator::Comparison(op) => Self::comparison(take()?, op, take()?),
            Operator::Logical(op) => {
                let first = take()?;
                let mut node = LogicalExpr::new(op, vec![first])?;
                while let Ok(operand) = take() {
                    node.push(operand);
                }
                Self::Logical(node)
            }
            Operator::Not => Self::not(take()?),
            Operator::IsNull => take()?.is_null(),
            Operator::IsNotNull => take()?.is_not_null(),
            Operator::Like => take()?.like(take()?),
            Operator::NotLike => take()?.not_like(take()?),
            Operator::Exists => match take()? {
                Self::Subquery(query) => Self::Exists {
                    query,
                    negated: false,
                },
                _ => return Err(Error::null_argument("sub-query operand for `exists`")),
            },
            Operator::Quantified(quantifier) => match take()? {
                Self::Subquery(query) => Self::Quantified { quantifier, query },
                _ => {
                    return Err(Error::null_argument(format!(
                        "sub-query operand for `{}`",
                        quantifier.as_sql()
                    )))
                }
            },
        };
        Ok(expr)
    }

    /// Create an arithmetic node without precedence folding
    pub fn arithmetic(left: impl IntoExpr, op: ArithmeticOperator, right: impl IntoExpr) -> Self {
        Self::Arithmetic(ArithmeticExpr {
            left: Box::new(left.into_expr()),
            op,
            right: Box::new(right.into_expr()),
        })
    }

    /// Create a comparison node
    pub fn comparison(left: impl IntoExpr, op: ComparisonOperator, right: impl IntoExpr) -> Self {
        Self::Comparison {
            left: Box::new(left.into_expr()),
            op,
            right: Box::new(right.into_expr()),
        }
    }

    // Arithmetic combinators

    /// Append `op rhs` to this expression, respecting precedence tiers
    ///
    /// When `op` binds tighter than this node's operator, `rhs` is folded into
    /// the right operand (recursively); otherwise the whole node becomes the
    /// left operand of a new node.
    pub fn append_arithmetic(self, op: ArithmeticOperator, rhs: impl IntoExpr) -> Self {
        match self {
            Self::Arithmetic(mut node) if op.tier() < node.op.tier() => {
                let right = std::mem::replace(&mut *node.right, Self::null());
                *node.right = right.append_arithmetic(op, rhs);
                Self::Arithmetic(node)
            }
            other => Self::arithmetic(other, op, rhs),
        }
    }

    pub fn plus(self, rhs: impl IntoExpr) -> Self {
        self.append_arithmetic(ArithmeticOperator::Plus, rhs)
    }

    pub fn minus(self, rhs: impl IntoExpr) -> Self {
        self.append_arithmetic(ArithmeticOperator::Minus, rhs)
    }

    pub fn multiply(self, rhs: impl IntoExpr) -> Self {
        self.append_arithmetic(ArithmeticOperator::Multiply, rhs)
    }

    pub fn divide(self, rhs: impl IntoExpr) -> Self {
        self.append_arithmetic(ArithmeticOperator::Divide, rhs)
    }

    pub fn modulo(self, rhs: impl IntoExpr) -> Self {
        self.append_arithmetic(ArithmeticOperator::Modulo, rhs)
    }

    /// String concatenation `||`
    pub fn concat(self, rhs: impl IntoExpr) -> Self {
        self.append_arithmetic(ArithmeticOperator::Concat, rhs)
    }

    // Comparison combinators

    pub fn eq(self, rhs: impl IntoExpr) -> Self {
        Self::comparison(self, ComparisonOperator::Eq, rhs)
    }

    pub fn ne(self, rhs: impl IntoExpr) -> Self {
        Self::comparison(self, ComparisonOperator::NotEq, rhs)
    }

    pub fn lt(self, rhs: impl IntoExpr) -> Self {
        Self::comparison(self, ComparisonOperator::Lt, rhs)
    }

    pub fn le(self, rhs: impl IntoExpr) -> Self {
        Self::comparison(self, ComparisonOperator::LtEq, rhs)
    }

    pub fn gt(self, rhs: impl IntoExpr) -> Self {
        Self::comparison(self, ComparisonOperator::Gt, rhs)
    }

    pub fn ge(self, rhs: impl IntoExpr) -> Self {
        Self::comparison(self, ComparisonOperator::GtEq, rhs)
    }

    // Logical combinators

    /// Combine with AND
    ///
    /// Appends to an AND node; on an OR node, binds to the last OR operand
    /// only.
    pub fn and(self, rhs: impl IntoExpr) -> Self {
        let rhs = rhs.into_expr();
        match self {
            Self::Logical(mut node) if node.op == LogicalOperator::And => {
                node.push(rhs);
                Self::Logical(node)
            }
            Self::Logical(mut node) if node.operands.len() > 1 => {
                // OR node: AND binds tighter, so it captures the last operand
                if let Some(last) = node.operands.pop() {
                    node.operands.push(last.and(rhs));
                }
                Self::Logical(node)
            }
            Self::Logical(node) => node.reduce().and(rhs),
            other => {
                let mut node = LogicalExpr {
                    op: LogicalOperator::And,
                    operands: vec![other],
                };
                node.push(rhs);
                Self::Logical(node)
            }
        }
    }

    /// Combine with OR
    ///
    /// Appends to an OR node; anything else becomes the first operand of a
    /// new OR node.
    pub fn or(self, rhs: impl IntoExpr) -> Self {
        let rhs = rhs.into_expr();
        match self {
            Self::Logical(mut node) if node.op == LogicalOperator::Or => {
                node.push(rhs);
                Self::Logical(node)
            }
            Self::Logical(node) if node.operands.len() == 1 => node.reduce().or(rhs),
            other => {
                let mut node = LogicalExpr {
                    op: LogicalOperator::Or,
                    operands: vec![other],
                };
                node.push(rhs);
                Self::Logical(node)
            }
        }
    }

    // Predicates

    pub fn between(self, low: impl IntoExpr, high: impl IntoExpr) -> Self {
        self.between_impl(low, high, false)
    }

    pub fn not_between(self, low: impl IntoExpr, high: impl IntoExpr) -> Self {
        self.between_impl(low, high, true)
    }

    fn between_impl(self, low: impl IntoExpr, high: impl IntoExpr, negated: bool) -> Self {
        Self::Between {
            expr: Box::new(self),
            low: Box::new(low.into_expr()),
            high: Box::new(high.into_expr()),
            negated,
        }
    }

    pub fn in_list<I, T>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        Self::InList {
            expr: Box::new(self),
            list: values.into_iter().map(IntoExpr::into_expr).collect(),
            negated: false,
        }
    }

    pub fn not_in_list<I, T>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        Self::InList {
            expr: Box::new(self),
            list: values.into_iter().map(IntoExpr::into_expr).collect(),
            negated: true,
        }
    }

    pub fn in_query(self, query: impl Into<Query>) -> Self {
        Self::InQuery {
            expr: Box::new(self),
            query: Box::new(query.into()),
            negated: false,
        }
    }

    pub fn not_in_query(self, query: impl Into<Query>) -> Self {
        Self::InQuery {
            expr: Box::new(self),
            query: Box::new(query.into()),
            negated: true,
        }
    }

    pub fn like(self, pattern: impl IntoExpr) -> Self {
        self.like_impl(pattern, None, false)
    }

    pub fn not_like(self, pattern: impl IntoExpr) -> Self {
        self.like_impl(pattern, None, true)
    }

    /// LIKE with an escape character
    ///
    /// The escape must be exactly one character.
    pub fn like_escape(self, pattern: impl IntoExpr, escape: &str) -> Result<Self> {
        let mut chars = escape.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(self.like_impl(pattern, Some(c), false)),
            (None, _) => Err(Error::null_argument("like escape character")),
            (Some(_), Some(_)) => Err(Error::invalid_literal(format!(
                "escape `{}` must be a single character",
                escape
            ))),
        }
    }

    fn like_impl(self, pattern: impl IntoExpr, escape: Option<char>, negated: bool) -> Self {
        Self::Like {
            expr: Box::new(self),
            pattern: Box::new(pattern.into_expr()),
            escape,
            negated,
        }
    }

    pub fn is_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    pub fn is_not_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    /// Create a type cast
    pub fn cast(self, target_type: SqlType) -> Self {
        Self::Cast {
            expr: Box::new(self),
            target_type,
        }
    }

    pub fn collate(self, collation: impl Into<Ident>) -> Self {
        Self::Collate {
            expr: Box::new(self),
            collation: collation.into(),
        }
    }

    /// Wrap in parentheses
    pub fn nested(self) -> Self {
        Self::Grouping(Box::new(self))
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}
