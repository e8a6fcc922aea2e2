//! SQL statement types
//!
//! This module defines the top-level SQL statement types: SELECT, set
//! operations (UNION / INTERSECT) and UPDATE.

use super::cte::Cte;
use super::expr::{Expr, Ident, IntoExpr, LogicalExpr, LogicalOperator, OrderByExpr};
use super::table::{Join, Table};
use super::window::Window;
use crate::error::{Error, Result};

/// Top-level SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Select(SelectStmt),
    SetOperation(SetOperationStmt),
    Update(UpdateStmt),
}

impl Stmt {
    pub fn select(stmt: SelectStmt) -> Self {
        Self::Select(stmt)
    }

    pub fn update(stmt: UpdateStmt) -> Self {
        Self::Update(stmt)
    }

    /// CTEs attached to the statement
    pub fn ctes(&self) -> &[Cte] {
        match self {
            Self::Select(s) => &s.ctes,
            Self::SetOperation(s) => &s.ctes,
            Self::Update(s) => &s.ctes,
        }
    }
}

impl From<SelectStmt> for Stmt {
    fn from(stmt: SelectStmt) -> Self {
        Self::Select(stmt)
    }
}

impl From<SetOperationStmt> for Stmt {
    fn from(stmt: SetOperationStmt) -> Self {
        Self::SetOperation(stmt)
    }
}

impl From<UpdateStmt> for Stmt {
    fn from(stmt: UpdateStmt) -> Self {
        Self::Update(stmt)
    }
}

impl From<Query> for Stmt {
    fn from(query: Query) -> Self {
        match query {
            Query::Select(s) => Self::Select(s),
            Query::SetOperation(s) => Self::SetOperation(s),
        }
    }
}

/// A statement that produces rows: usable as a sub-query, derived table or
/// CTE body
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Select(SelectStmt),
    SetOperation(SetOperationStmt),
}

impl From<SelectStmt> for Query {
    fn from(stmt: SelectStmt) -> Self {
        Self::Select(stmt)
    }
}

impl From<SetOperationStmt> for Query {
    fn from(stmt: SetOperationStmt) -> Self {
        Self::SetOperation(stmt)
    }
}

/// Start a SELECT statement
pub fn select() -> SelectStmt {
    SelectStmt::new()
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStmt {
    /// WITH clause (CTEs)
    pub ctes: Vec<Cte>,
    /// WITH RECURSIVE
    pub recursive: bool,
    /// Optimizer hints, emitted verbatim after `select`
    pub hints: Vec<String>,
    pub distinct: bool,
    /// Projection; empty renders `*`
    pub columns: Vec<SelectItem>,
    /// FROM list
    pub from: Vec<Table>,
    pub joins: Vec<Join>,
    /// WHERE conditions, AND-combined
    pub where_clause: Vec<Expr>,
    pub group_by: Vec<Expr>,
    /// HAVING conditions, AND-combined
    pub having: Vec<Expr>,
    /// Named windows for the WINDOW clause
    pub windows: Vec<Window>,
    pub order_by: Vec<OrderByExpr>,
    pub offset: Option<Expr>,
    pub fetch: Option<Expr>,
}

impl SelectStmt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a SELECT with the given projection
    pub fn columns<I, T>(columns: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SelectItem>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Append a projected expression
    pub fn column(mut self, expr: impl IntoExpr) -> Self {
        self.columns.push(SelectItem::new(expr));
        self
    }

    /// Append a projected expression with an alias: `expr as alias`
    pub fn column_as(mut self, expr: impl IntoExpr, alias: impl Into<Ident>) -> Self {
        self.columns.push(SelectItem::aliased(expr, alias));
        self
    }

    pub fn with_cte(mut self, cte: &Cte) -> Self {
        self.ctes.push(cte.clone());
        self
    }

    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Append a table to the FROM list
    pub fn from(mut self, table: &Table) -> Self {
        self.from.push(table.clone());
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Append a WHERE condition
    pub fn with_where(mut self, condition: impl IntoExpr) -> Self {
        self.where_clause.push(condition.into_expr());
        self
    }

    pub fn group_by(mut self, expr: impl IntoExpr) -> Self {
        self.group_by.push(expr.into_expr());
        self
    }

    /// Append a HAVING condition
    pub fn having(mut self, condition: impl IntoExpr) -> Self {
        self.having.push(condition.into_expr());
        self
    }

    /// List a window in the WINDOW clause
    pub fn window(mut self, window: &Window) -> Self {
        self.windows.push(window.clone());
        self
    }

    pub fn order_by(mut self, order: OrderByExpr) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn offset(mut self, rows: impl IntoExpr) -> Self {
        self.offset = Some(rows.into_expr());
        self
    }

    pub fn fetch(mut self, rows: impl IntoExpr) -> Self {
        self.fetch = Some(rows.into_expr());
        self
    }
}

/// A column in a SELECT clause
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<Ident>,
}

impl SelectItem {
    pub fn new(expr: impl IntoExpr) -> Self {
        Self {
            expr: expr.into_expr(),
            alias: None,
        }
    }

    pub fn aliased(expr: impl IntoExpr, alias: impl Into<Ident>) -> Self {
        Self {
            expr: expr.into_expr(),
            alias: Some(alias.into()),
        }
    }
}

impl From<Expr> for SelectItem {
    fn from(expr: Expr) -> Self {
        Self::new(expr)
    }
}

/// Set operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
}

impl SetOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Union => "union",
            Self::UnionAll => "union all",
            Self::Intersect => "intersect",
        }
    }
}

/// UNION / UNION ALL / INTERSECT over two or more selects
///
/// ORDER BY, OFFSET and FETCH apply to the combined result.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOperationStmt {
    pub ctes: Vec<Cte>,
    pub recursive: bool,
    pub op: SetOperator,
    operands: Vec<SelectStmt>,
    pub order_by: Vec<OrderByExpr>,
    pub offset: Option<Expr>,
    pub fetch: Option<Expr>,
}

impl SetOperationStmt {
    pub fn new(op: SetOperator, operands: Vec<SelectStmt>) -> Result<Self> {
        if operands.len() < 2 {
            return Err(Error::empty_operands(format!(
                "{} requires at least two selects, got {}",
                op.as_sql(),
                operands.len()
            )));
        }
        Ok(Self {
            ctes: Vec::new(),
            recursive: false,
            op,
            operands,
            order_by: Vec::new(),
            offset: None,
            fetch: None,
        })
    }

    pub fn union(left: SelectStmt, right: SelectStmt) -> Self {
        Self::pair(SetOperator::Union, left, right)
    }

    pub fn union_all(left: SelectStmt, right: SelectStmt) -> Self {
        Self::pair(SetOperator::UnionAll, left, right)
    }

    pub fn intersect(left: SelectStmt, right: SelectStmt) -> Self {
        Self::pair(SetOperator::Intersect, left, right)
    }

    fn pair(op: SetOperator, left: SelectStmt, right: SelectStmt) -> Self {
        Self {
            ctes: Vec::new(),
            recursive: false,
            op,
            operands: vec![left, right],
            order_by: Vec::new(),
            offset: None,
            fetch: None,
        }
    }

    /// Append another operand
    pub fn and_select(mut self, select: SelectStmt) -> Self {
        self.operands.push(select);
        self
    }

    pub fn operands(&self) -> &[SelectStmt] {
        &self.operands
    }

    pub fn with_cte(mut self, cte: &Cte) -> Self {
        self.ctes.push(cte.clone());
        self
    }

    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    pub fn order_by(mut self, order: OrderByExpr) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn offset(mut self, rows: impl IntoExpr) -> Self {
        self.offset = Some(rows.into_expr());
        self
    }

    pub fn fetch(mut self, rows: impl IntoExpr) -> Self {
        self.fetch = Some(rows.into_expr());
        self
    }
}

/// UPDATE statement
///
/// Built through [`UpdateStmt::builder`] so that a target table and at least
/// one assignment are guaranteed.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub ctes: Vec<Cte>,
    pub recursive: bool,
    pub table: Table,
    /// SET column = value pairs
    pub set: Vec<(Ident, Expr)>,
    /// WHERE conditions, AND-combined
    pub where_clause: Vec<Expr>,
}

impl UpdateStmt {
    pub fn builder() -> UpdateBuilder {
        UpdateBuilder::default()
    }
}

/// Collects the parts of an UPDATE before validating them
#[derive(Debug, Clone, Default)]
pub struct UpdateBuilder {
    ctes: Vec<Cte>,
    recursive: bool,
    table: Option<Table>,
    set: Vec<(Ident, Expr)>,
    where_clause: Vec<Expr>,
}

impl UpdateBuilder {
    pub fn with_cte(mut self, cte: &Cte) -> Self {
        self.ctes.push(cte.clone());
        self
    }

    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    pub fn table(mut self, table: &Table) -> Self {
        self.table = Some(table.clone());
        self
    }

    /// Append `column = value`
    pub fn set(mut self, column: impl Into<Ident>, value: impl IntoExpr) -> Self {
        self.set.push((column.into(), value.into_expr()));
        self
    }

    pub fn with_where(mut self, condition: impl IntoExpr) -> Self {
        self.where_clause.push(condition.into_expr());
        self
    }

    pub fn build(self) -> Result<UpdateStmt> {
        let table = self.table.ok_or_else(|| Error::null_argument("table"))?;
        if self.set.is_empty() {
            return Err(Error::missing_clause("set"));
        }
        Ok(UpdateStmt {
            ctes: self.ctes,
            recursive: self.recursive,
            table,
            set: self.set,
            where_clause: self.where_clause,
        })
    }
}

/// AND-combine a condition list into one expression
///
/// Returns `None` for an empty list. A single condition is returned as is.
pub fn conjunction(conditions: &[Expr]) -> Option<Expr> {
    let (first, rest) = conditions.split_first()?;
    let mut node = LogicalExpr::new(LogicalOperator::And, vec![first.clone()]).ok()?;
    for condition in rest {
        node.push(condition.clone());
    }
    Some(node.reduce())
}
