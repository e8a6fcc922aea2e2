//! Parameter handling for prepared statements
//!
//! A [`Placeholder`] renders as a bind marker instead of its value. The value
//! can be rebound at any time before the statement is executed; the
//! [`collect_placeholders`] walk returns the placeholders in the order their
//! markers appear in the rendered text, which is the order a driver expects
//! the values in.

use super::cte::Cte;
use super::expr::{Expr, FunctionCall, OrderByExpr};
use super::literal::Literal;
use super::node::NodeId;
use super::stmt::{conjunction, Query, SelectStmt, SetOperationStmt, Stmt, UpdateStmt};
use super::table::{Join, Table, TableSource};
use super::window::{Frame, Window};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

struct PlaceholderNode {
    id: NodeId,
    name: Option<String>,
    value: RwLock<Literal>,
    properties: RwLock<HashMap<String, serde_json::Value>>,
}

/// A bind parameter with a rebindable value
///
/// Clones share the value: binding through one handle is visible through all
/// of them.
#[derive(Clone)]
pub struct Placeholder {
    inner: Arc<PlaceholderNode>,
}

impl Placeholder {
    pub fn new(value: impl Into<Literal>) -> Self {
        Self::build(None, value.into())
    }

    /// Create a placeholder with a name, used by [`NamedMarker`]
    pub fn named(name: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::build(Some(name.into()), value.into())
    }

    fn build(name: Option<String>, value: Literal) -> Self {
        Self {
            inner: Arc::new(PlaceholderNode {
                id: NodeId::next(),
                name,
                value: RwLock::new(value),
                properties: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Current value
    pub fn value(&self) -> Literal {
        self.inner.value.read().clone()
    }

    /// Replace the value
    pub fn bind(&self, value: impl Into<Literal>) {
        *self.inner.value.write() = value.into();
    }

    /// Attach an arbitrary user property
    pub fn set_property(&self, key: impl Into<String>, value: serde_json::Value) {
        self.inner.properties.write().insert(key.into(), value);
    }

    pub fn property(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.properties.read().get(key).cloned()
    }
}

impl PartialEq for Placeholder {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl std::fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Placeholder")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("value", &*self.inner.value.read())
            .finish()
    }
}

/// Builds the text of a bind marker
///
/// `position` is the 1-based index of the placeholder in the rendered text.
pub trait PlaceholderMarker: Send + Sync {
    fn marker(&self, position: usize, placeholder: &Placeholder) -> String;
}

/// `?`
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionMarker;

impl PlaceholderMarker for QuestionMarker {
    fn marker(&self, _position: usize, _placeholder: &Placeholder) -> String {
        "?".to_string()
    }
}

/// `$1`, `$2`, …
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberedMarker;

impl PlaceholderMarker for NumberedMarker {
    fn marker(&self, position: usize, _placeholder: &Placeholder) -> String {
        format!("${}", position)
    }
}

/// `:name`, or `:p<n>` for unnamed placeholders
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedMarker;

impl PlaceholderMarker for NamedMarker {
    fn marker(&self, position: usize, placeholder: &Placeholder) -> String {
        match placeholder.name() {
            Some(name) => format!(":{}", name),
            None => format!(":p{}", position),
        }
    }
}

/// A collected parameter with its position and value
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// 1-indexed position in the rendered text
    pub index: usize,
    pub value: Literal,
    pub name: Option<String>,
}

/// Placeholders of a statement in rendered-text order
pub fn collect_placeholders(stmt: &Stmt) -> Vec<Placeholder> {
    let mut collector = PlaceholderCollector::default();
    collector.visit_stmt(stmt);
    collector.found
}

/// Placeholders of a standalone expression in rendered-text order
pub fn collect_expr_placeholders(expr: &Expr) -> Vec<Placeholder> {
    let mut collector = PlaceholderCollector::default();
    collector.visit_expr(expr);
    collector.found
}

/// The ordered bind list for a statement
pub fn params(stmt: &Stmt) -> Vec<Param> {
    let params: Vec<Param> = collect_placeholders(stmt)
        .iter()
        .enumerate()
        .map(|(i, p)| Param {
            index: i + 1,
            value: p.value(),
            name: p.name().map(str::to_string),
        })
        .collect();
    crate::telemetry::log_params(&params);
    params
}

/// Walks a tree in the same order the renderer emits it
///
/// A placeholder referenced twice is bound twice, so nothing is deduplicated.
/// Windows listed in a WINDOW clause are tracked the same way the renderer
/// does: a window function over such a window renders only the name, so its
/// specification is visited at the clause instead.
#[derive(Default)]
struct PlaceholderCollector {
    found: Vec<Placeholder>,
    window_scopes: Vec<HashSet<NodeId>>,
}

impl PlaceholderCollector {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Select(s) => self.visit_select(s),
            Stmt::SetOperation(s) => self.visit_set_operation(s),
            Stmt::Update(s) => self.visit_update(s),
        }
    }

    fn visit_query(&mut self, query: &Query) {
        match query {
            Query::Select(s) => self.visit_select(s),
            Query::SetOperation(s) => self.visit_set_operation(s),
        }
    }

    fn visit_ctes(&mut self, ctes: &[Cte]) {
        for cte in ctes {
            self.visit_query(cte.query());
        }
    }

    fn visit_select(&mut self, stmt: &SelectStmt) {
        self.visit_ctes(&stmt.ctes);
        self.window_scopes
            .push(stmt.windows.iter().map(Window::id).collect());

        for item in &stmt.columns {
            self.visit_expr(&item.expr);
        }
        for table in &stmt.from {
            self.visit_table(table);
        }
        for join in &stmt.joins {
            self.visit_join(join);
        }
        self.visit_conditions(&stmt.where_clause);
        self.visit_exprs(&stmt.group_by);
        self.visit_conditions(&stmt.having);
        for window in &stmt.windows {
            self.visit_window_spec(window);
        }
        self.visit_order_by(&stmt.order_by);
        self.visit_opt(stmt.offset.as_ref());
        self.visit_opt(stmt.fetch.as_ref());

        self.window_scopes.pop();
    }

    fn visit_set_operation(&mut self, stmt: &SetOperationStmt) {
        self.visit_ctes(&stmt.ctes);
        for operand in stmt.operands() {
            self.visit_select(operand);
        }
        self.window_scopes.push(HashSet::new());
        self.visit_order_by(&stmt.order_by);
        self.visit_opt(stmt.offset.as_ref());
        self.visit_opt(stmt.fetch.as_ref());
        self.window_scopes.pop();
    }

    fn visit_update(&mut self, stmt: &UpdateStmt) {
        self.visit_ctes(&stmt.ctes);
        self.visit_table(&stmt.table);
        for (_, value) in &stmt.set {
            self.visit_expr(value);
        }
        self.visit_conditions(&stmt.where_clause);
    }

    fn visit_table(&mut self, table: &Table) {
        if let TableSource::Query(query) = table.source() {
            self.visit_query(query);
        }
    }

    fn visit_join(&mut self, join: &Join) {
        self.visit_table(&join.table);
        self.visit_conditions(&join.conditions);
    }

    fn visit_conditions(&mut self, conditions: &[Expr]) {
        if let Some(condition) = conjunction(conditions) {
            self.visit_expr(&condition);
        }
    }

    fn visit_exprs(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.visit_expr(expr);
        }
    }

    fn visit_opt(&mut self, expr: Option<&Expr>) {
        if let Some(expr) = expr {
            self.visit_expr(expr);
        }
    }

    fn visit_order_by(&mut self, order_by: &[OrderByExpr]) {
        for ob in order_by {
            self.visit_expr(&ob.expr);
        }
    }

    fn visit_window_spec(&mut self, window: &Window) {
        self.visit_exprs(window.partitions());
        self.visit_order_by(window.orderings());
        if let Some(frame) = window.frame() {
            self.visit_frame(frame);
        }
    }

    fn visit_frame(&mut self, frame: &Frame) {
        self.visit_opt(frame.start.offset());
        if let Some(end) = &frame.end {
            self.visit_opt(end.offset());
        }
    }

    fn visit_function(&mut self, call: &FunctionCall) {
        self.visit_exprs(&call.args);
    }

    fn is_declared(&self, window: &Window) -> bool {
        self.window_scopes
            .last()
            .is_some_and(|scope| scope.contains(&window.id()))
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Placeholder(p) => self.found.push(p.clone()),
            Expr::Literal(_) | Expr::Column(_) | Expr::Wildcard(_) => {}
            Expr::Arithmetic(node) => {
                self.visit_expr(&node.left);
                self.visit_expr(&node.right);
            }
            Expr::Comparison { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            Expr::Quantified { query, .. } => self.visit_query(query),
            Expr::Logical(node) => self.visit_exprs(node.operands()),
            Expr::Not(inner) => self.visit_expr(inner),
            Expr::Between {
                expr, low, high, ..
            } => {
                self.visit_expr(expr);
                self.visit_expr(low);
                self.visit_expr(high);
            }
            Expr::InList { expr, list, .. } => {
                self.visit_expr(expr);
                self.visit_exprs(list);
            }
            Expr::InQuery { expr, query, .. } => {
                self.visit_expr(expr);
                self.visit_query(query);
            }
            Expr::Like { expr, pattern, .. } => {
                self.visit_expr(expr);
                self.visit_expr(pattern);
            }
            Expr::IsNull { expr, .. } => self.visit_expr(expr),
            Expr::Exists { query, .. } => self.visit_query(query),
            Expr::Case(case) => {
                if let Some(operand) = &case.operand {
                    self.visit_expr(operand);
                }
                for (when, then) in &case.when_clauses {
                    self.visit_expr(when);
                    self.visit_expr(then);
                }
                if let Some(else_clause) = &case.else_clause {
                    self.visit_expr(else_clause);
                }
            }
            Expr::Cast { expr, .. } => self.visit_expr(expr),
            Expr::Collate { expr, .. } => self.visit_expr(expr),
            Expr::Function(call) => self.visit_function(call),
            Expr::WindowFunction { function, window } => {
                self.visit_function(function);
                if !self.is_declared(window) {
                    self.visit_window_spec(window);
                }
            }
            Expr::Subquery(query) => self.visit_query(query),
            Expr::Grouping(inner) => self.visit_expr(inner),
        }
    }
}
