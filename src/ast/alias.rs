//! Alias allocation for one render pass
//!
//! Tables, CTEs and windows that are not given an explicit name receive a
//! short generated one. The sequence is deterministic: `a` through `z`, then
//! `a1` through `z1`, `a2` and so on.
//!
//! An allocator belongs to exactly one render call. [`AliasScope`] pairs it
//! with the side table that maps node identities to the alias they were
//! given, so every reference to the same node resolves to the same name.

use super::cte::Cte;
use super::expr::{Expr, FunctionCall, Ident, OrderByExpr};
use super::node::NodeId;
use super::stmt::{Query, SelectStmt, SetOperationStmt, Stmt, UpdateStmt};
use super::table::{Table, TableSource};
use super::window::Window;
use std::collections::{HashMap, HashSet};

/// Source of generated aliases
pub trait AliasAllocator: Send {
    /// Produce the next alias in the sequence
    fn next(&mut self) -> String;

    /// The most recently produced alias, if any
    fn current(&self) -> Option<String>;

    /// Restart the sequence from the beginning
    fn reset(&mut self);
}

/// The default `a, b, …, z, a1, b1, …` allocator
#[derive(Debug, Clone, Default)]
pub struct LetterAllocator {
    issued: usize,
}

impl LetterAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn alias_at(position: usize) -> String {
        let letter = char::from(b'a' + (position % 26) as u8);
        let cycle = position / 26;
        if cycle == 0 {
            letter.to_string()
        } else {
            format!("{}{}", letter, cycle)
        }
    }
}

impl AliasAllocator for LetterAllocator {
    fn next(&mut self) -> String {
        let alias = Self::alias_at(self.issued);
        self.issued += 1;
        alias
    }

    fn current(&self) -> Option<String> {
        self.issued.checked_sub(1).map(Self::alias_at)
    }

    fn reset(&mut self) {
        self.issued = 0;
    }
}

/// Identity-keyed alias assignments for a single render
pub struct AliasScope {
    allocator: Box<dyn AliasAllocator>,
    assigned: HashMap<NodeId, Ident>,
    /// Explicit names, lower-cased; never handed out as generated aliases
    reserved: HashSet<String>,
}

impl AliasScope {
    pub fn new(allocator: Box<dyn AliasAllocator>) -> Self {
        Self {
            allocator,
            assigned: HashMap::new(),
            reserved: HashSet::new(),
        }
    }

    /// Keep `name` out of the generated sequence
    pub fn reserve(&mut self, name: &Ident) {
        self.reserved.insert(name.as_str().to_lowercase());
    }

    /// Reserve every explicit table, CTE and window name in a statement
    pub fn reserve_stmt(&mut self, stmt: &Stmt) {
        let mut walk = ExplicitNames::default();
        walk.visit_stmt(stmt);
        self.reserved.extend(walk.names);
    }

    /// Reserve every explicit name reachable from an expression
    pub fn reserve_expr(&mut self, expr: &Expr) {
        let mut walk = ExplicitNames::default();
        walk.visit_expr(expr);
        self.reserved.extend(walk.names);
    }

    /// Resolve the name for a node
    ///
    /// An explicit name always wins. Otherwise the first lookup for `id`
    /// draws a fresh alias, skipping reserved names, and later lookups
    /// return the same one.
    pub fn resolve(&mut self, id: NodeId, explicit: Option<&Ident>) -> Ident {
        if let Some(name) = explicit {
            self.reserve(name);
            return name.clone();
        }
        if let Some(alias) = self.assigned.get(&id) {
            return alias.clone();
        }

        // A sequence of distinct names is rejected at most once per reserved name
        let mut candidate = self.allocator.next();
        for _ in 0..self.reserved.len() {
            if !self.reserved.contains(&candidate.to_lowercase()) {
                break;
            }
            candidate = self.allocator.next();
        }

        let alias = Ident::new(candidate);
        crate::telemetry::log_alias(&id.to_string(), alias.as_str());
        self.assigned.insert(id, alias.clone());
        alias
    }

    /// Alias already assigned to a node, without allocating
    pub fn get(&self, id: NodeId) -> Option<&Ident> {
        self.assigned.get(&id)
    }

    /// Number of generated aliases handed out so far
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Forget all assignments and reservations and restart the allocator
    pub fn reset(&mut self) {
        self.assigned.clear();
        self.reserved.clear();
        self.allocator.reset();
    }
}

/// Collects explicit names: table aliases, CTE names and window names
#[derive(Default)]
struct ExplicitNames {
    names: HashSet<String>,
    visited: HashSet<NodeId>,
}

impl ExplicitNames {
    fn add(&mut self, name: Option<&Ident>) {
        if let Some(name) = name {
            self.names.insert(name.as_str().to_lowercase());
        }
    }

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
            if self.visited.insert(cte.id()) {
                self.add(cte.name());
                self.visit_query(cte.query());
            }
        }
    }

    fn visit_select(&mut self, stmt: &SelectStmt) {
        self.visit_ctes(&stmt.ctes);
        for item in &stmt.columns {
            self.visit_expr(&item.expr);
        }
        for table in &stmt.from {
            self.visit_table(table);
        }
        for join in &stmt.joins {
            self.visit_table(&join.table);
            self.visit_exprs(&join.conditions);
        }
        self.visit_exprs(&stmt.where_clause);
        self.visit_exprs(&stmt.group_by);
        self.visit_exprs(&stmt.having);
        for window in &stmt.windows {
            self.visit_window(window);
        }
        self.visit_tail(&stmt.order_by, stmt.offset.as_ref(), stmt.fetch.as_ref());
    }

    fn visit_set_operation(&mut self, stmt: &SetOperationStmt) {
        self.visit_ctes(&stmt.ctes);
        for operand in stmt.operands() {
            self.visit_select(operand);
        }
        self.visit_tail(&stmt.order_by, stmt.offset.as_ref(), stmt.fetch.as_ref());
    }

    fn visit_update(&mut self, stmt: &UpdateStmt) {
        self.visit_ctes(&stmt.ctes);
        self.visit_table(&stmt.table);
        for (_, value) in &stmt.set {
            self.visit_expr(value);
        }
        self.visit_exprs(&stmt.where_clause);
    }

    fn visit_tail(&mut self, order_by: &[OrderByExpr], offset: Option<&Expr>, fetch: Option<&Expr>) {
        for ob in order_by {
            self.visit_expr(&ob.expr);
        }
        for expr in offset.into_iter().chain(fetch) {
            self.visit_expr(expr);
        }
    }

    fn visit_table(&mut self, table: &Table) {
        if !self.visited.insert(table.id()) {
            return;
        }
        self.add(table.alias());
        match table.source() {
            TableSource::Named { .. } => {}
            TableSource::Query(query) => self.visit_query(query),
            TableSource::Cte(cte) => self.add(cte.name.as_ref()),
        }
    }

    fn visit_window(&mut self, window: &Window) {
        if !self.visited.insert(window.id()) {
            return;
        }
        self.add(window.name());
        if let Some(base) = window.base() {
            self.visit_window(base);
        }
        self.visit_exprs(window.partitions());
        for ob in window.orderings() {
            self.visit_expr(&ob.expr);
        }
    }

    fn visit_function(&mut self, call: &FunctionCall) {
        self.visit_exprs(&call.args);
    }

    fn visit_exprs(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.visit_expr(expr);
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) | Expr::Placeholder(_) => {}
            Expr::Column(col) => {
                if let Some(table) = &col.table {
                    self.visit_table(table);
                }
            }
            Expr::Wildcard(table) => {
                if let Some(table) = table {
                    self.visit_table(table);
                }
            }
            Expr::Arithmetic(node) => {
                self.visit_expr(&node.left);
                self.visit_expr(&node.right);
            }
            Expr::Comparison { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            Expr::Logical(node) => self.visit_exprs(node.operands()),
            Expr::Not(inner) | Expr::Grouping(inner) => self.visit_expr(inner),
            Expr::Between { expr, low, high, .. } => {
                self.visit_expr(expr);
                self.visit_expr(low);
                self.visit_expr(high);
            }
            Expr::InList { expr, list, .. } => {
                self.visit_expr(expr);
                self.visit_exprs(list);
            }
            Expr::Like { expr, pattern, .. } => {
                self.visit_expr(expr);
                self.visit_expr(pattern);
            }
            Expr::IsNull { expr, .. } | Expr::Cast { expr, .. } | Expr::Collate { expr, .. } => {
                self.visit_expr(expr)
            }
            Expr::InQuery { expr, query, .. } => {
                self.visit_expr(expr);
                self.visit_query(query);
            }
            Expr::Quantified { query, .. }
            | Expr::Exists { query, .. }
            | Expr::Subquery(query) => self.visit_query(query),
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
            Expr::Function(call) => self.visit_function(call),
            Expr::WindowFunction { function, window } => {
                self.visit_function(function);
                self.visit_window(window);
            }
        }
    }
}

impl std::fmt::Debug for AliasScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasScope")
            .field("current", &self.allocator.current())
            .field("assigned", &self.assigned)
            .finish()
    }
}
