//! SQL string rendering
//!
//! This module converts AST nodes to SQL strings. It is the only place
//! in the codebase where SQL strings are constructed.
//!
//! # Architecture
//!
//! The rendering system is built around two key components:
//!
//! - [`Render`] trait: Implemented by AST nodes to define how they render to SQL
//! - [`SqlRenderer`]: The rendering context that handles output buffering,
//!   formatting, alias assignment and placeholder numbering
//!
//! A renderer is good for exactly one statement. It owns a fresh alias
//! allocator, so rendering the same tree twice produces the same text and
//! concurrent renders never share counters.
//!
//! # Parentheses
//!
//! Only the parentheses needed to reproduce the tree are emitted. Arithmetic
//! follows the usual tiers (`*` `/` `%` bind tighter than `+` `-` `||`, and
//! `||` is never left bare next to `+` or `-`), an
//! AND/OR list with more than one operand is wrapped whenever it is nested,
//! and a clause's top-level list (WHERE, HAVING, ON) is wrapped unless
//! [`RenderConfig::strip_parentheses`] is set.

use super::alias::AliasScope;
use super::config::RenderConfig;
use super::cte::Cte;
use super::expr::*;
use super::literal::Literal;
use super::node::NodeId;
use super::params::Placeholder;
use super::stmt::*;
use super::table::{Join, Table, TableSource};
use super::types::{SqlType, TypeName};
use super::window::{BoundKind, Frame, FrameBound, Window};
use crate::telemetry;
use chrono::Timelike;
use std::collections::HashSet;

// =============================================================================
// Render Trait
// =============================================================================

/// Trait for AST nodes that can be rendered to SQL.
///
/// # Example
///
/// ```rust,ignore
/// use sqltree::ast::{Render, RenderConfig, SqlRenderer, Expr};
///
/// let config = RenderConfig::default();
/// let mut renderer = SqlRenderer::new(&config);
/// Expr::int(42).render(&mut renderer);
/// assert_eq!(renderer.into_sql(), "42");
/// ```
pub trait Render {
    /// Render this node to the given SQL renderer
    fn render(&self, renderer: &mut SqlRenderer<'_>);
}

impl Render for Stmt {
    fn render(&self, renderer: &mut SqlRenderer<'_>) {
        renderer.render_stmt(self);
    }
}

impl Render for Query {
    fn render(&self, renderer: &mut SqlRenderer<'_>) {
        renderer.render_query(self);
    }
}

impl Render for SelectStmt {
    fn render(&self, renderer: &mut SqlRenderer<'_>) {
        renderer.render_select(self);
    }
}

impl Render for SetOperationStmt {
    fn render(&self, renderer: &mut SqlRenderer<'_>) {
        renderer.render_set_operation(self);
    }
}

impl Render for UpdateStmt {
    fn render(&self, renderer: &mut SqlRenderer<'_>) {
        renderer.render_update(self);
    }
}

impl Render for Expr {
    fn render(&self, renderer: &mut SqlRenderer<'_>) {
        renderer.render_condition(self);
    }
}

impl Render for Literal {
    fn render(&self, renderer: &mut SqlRenderer<'_>) {
        renderer.render_literal(self);
    }
}

// =============================================================================
// Constants
// =============================================================================

/// Default buffer capacity for simple queries
const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Buffer capacity for queries with CTEs
const CTE_BUFFER_CAPACITY: usize = 4096;

/// Buffer capacity for complex queries with many CTEs
const LARGE_BUFFER_CAPACITY: usize = 8192;

/// SQL renderer for one statement
pub struct SqlRenderer<'a> {
    config: &'a RenderConfig,
    output: String,
    indent_level: usize,
    aliases: AliasScope,
    /// Windows declared by the WINDOW clause of each enclosing select
    window_scopes: Vec<HashSet<NodeId>>,
    placeholders: usize,
}

impl<'a> SqlRenderer<'a> {
    /// Create a renderer with its own alias allocator
    pub fn new(config: &'a RenderConfig) -> Self {
        Self::with_capacity(config, DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a renderer with a specific buffer capacity
    pub fn with_capacity(config: &'a RenderConfig, capacity: usize) -> Self {
        Self {
            config,
            output: String::with_capacity(capacity),
            indent_level: 0,
            aliases: AliasScope::new(config.allocator.create()),
            window_scopes: Vec::new(),
            placeholders: 0,
        }
    }

    /// Estimate appropriate buffer capacity based on statement complexity
    pub fn estimate_capacity(stmt: &Stmt) -> usize {
        let cte_count = stmt.ctes().len();
        if cte_count >= 5 {
            LARGE_BUFFER_CAPACITY
        } else if cte_count > 0 {
            CTE_BUFFER_CAPACITY
        } else {
            DEFAULT_BUFFER_CAPACITY
        }
    }

    /// Render a statement and return the SQL string
    pub fn render_stmt(&mut self, stmt: &Stmt) -> &str {
        self.aliases.reserve_stmt(stmt);
        match stmt {
            Stmt::Select(s) => self.render_select(s),
            Stmt::SetOperation(s) => self.render_set_operation(s),
            Stmt::Update(s) => self.render_update(s),
        }
        &self.output
    }

    /// Aliases assigned so far
    pub fn aliases(&self) -> &AliasScope {
        &self.aliases
    }

    /// Number of placeholder markers emitted so far
    pub fn placeholder_count(&self) -> usize {
        self.placeholders
    }

    /// Take ownership of the rendered SQL string
    pub fn into_sql(self) -> String {
        self.output
    }

    // =========================================================================
    // Statement rendering
    // =========================================================================

    fn render_query(&mut self, query: &Query) {
        match query {
            Query::Select(s) => self.render_select(s),
            Query::SetOperation(s) => self.render_set_operation(s),
        }
    }

    fn render_select(&mut self, stmt: &SelectStmt) {
        self.render_ctes(&stmt.ctes, stmt.recursive);
        self.window_scopes
            .push(stmt.windows.iter().map(Window::id).collect());

        self.keyword("select");
        for hint in &stmt.hints {
            self.write(" ");
            self.write(hint);
        }
        if stmt.distinct {
            self.write(" ");
            self.keyword("distinct");
        }
        self.write(" ");
        self.render_select_columns(&stmt.columns);

        if !stmt.from.is_empty() {
            self.newline();
            self.keyword("from");
            self.write(" ");
            for (i, table) in stmt.from.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.render_table(table);
            }
        }

        for join in &stmt.joins {
            self.newline();
            self.render_join(join);
        }

        self.render_where(&stmt.where_clause);

        if !stmt.group_by.is_empty() {
            self.newline();
            self.keyword("group by");
            self.write(" ");
            self.render_expr_list(&stmt.group_by);
        }

        if let Some(having) = conjunction(&stmt.having) {
            self.newline();
            self.keyword("having");
            self.write(" ");
            self.render_condition(&having);
        }

        if !stmt.windows.is_empty() {
            self.newline();
            self.keyword("window");
            self.write(" ");
            for (i, window) in stmt.windows.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                let name = self.window_name(window);
                self.write_ident(&name);
                self.write(" ");
                self.keyword("as");
                self.write(" (");
                self.render_window_spec(window);
                self.write(")");
            }
        }

        self.render_tail(&stmt.order_by, stmt.offset.as_ref(), stmt.fetch.as_ref());
        self.window_scopes.pop();
    }

    fn render_set_operation(&mut self, stmt: &SetOperationStmt) {
        self.render_ctes(&stmt.ctes, stmt.recursive);

        for (i, operand) in stmt.operands().iter().enumerate() {
            if i > 0 {
                self.newline();
                self.keyword(stmt.op.as_sql());
                self.newline();
            }
            self.write("(");
            self.indent();
            self.soft_break();
            self.render_select(operand);
            self.dedent();
            self.soft_break();
            self.write(")");
        }

        self.window_scopes.push(HashSet::new());
        self.render_tail(&stmt.order_by, stmt.offset.as_ref(), stmt.fetch.as_ref());
        self.window_scopes.pop();
    }

    fn render_update(&mut self, stmt: &UpdateStmt) {
        self.render_ctes(&stmt.ctes, stmt.recursive);
        self.keyword("update");
        self.write(" ");
        self.render_table(&stmt.table);

        self.newline();
        self.keyword("set");
        self.write(" ");
        for (i, (col, expr)) in stmt.set.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write_ident(col);
            self.write(" = ");
            self.render_expr(expr);
        }

        self.render_where(&stmt.where_clause);
    }

    fn render_where(&mut self, conditions: &[Expr]) {
        if let Some(condition) = conjunction(conditions) {
            self.newline();
            self.keyword("where");
            self.write(" ");
            self.render_condition(&condition);
        }
    }

    /// ORDER BY / OFFSET / FETCH
    fn render_tail(&mut self, order_by: &[OrderByExpr], offset: Option<&Expr>, fetch: Option<&Expr>) {
        if !order_by.is_empty() {
            self.newline();
            self.keyword("order by");
            self.write(" ");
            self.render_order_by(order_by);
        }

        if let Some(offset) = offset {
            self.newline();
            self.keyword("offset");
            self.write(" ");
            self.render_expr(offset);
            self.write(" ");
            self.keyword("rows");
        }

        if let Some(fetch) = fetch {
            self.newline();
            self.keyword("fetch next");
            self.write(" ");
            self.render_expr(fetch);
            self.write(" ");
            self.keyword("rows only");
        }
    }

    // =========================================================================
    // CTE rendering
    // =========================================================================

    fn render_ctes(&mut self, ctes: &[Cte], recursive: bool) {
        if ctes.is_empty() {
            return;
        }

        self.keyword("with");
        if recursive {
            self.write(" ");
            self.keyword("recursive");
        }
        self.write(" ");
        for (i, cte) in ctes.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.render_cte(cte);
        }
        self.newline();
    }

    fn render_cte(&mut self, cte: &Cte) {
        let name = self.aliases.resolve(cte.id(), cte.name());
        self.write_ident(&name);

        if let Some(columns) = cte.columns() {
            self.write("(");
            for (i, col) in columns.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.write_ident(col);
            }
            self.write(")");
        }

        self.write(" ");
        self.keyword("as");
        self.write(" ");
        self.render_subquery(cte.query());
    }

    // =========================================================================
    // FROM clause rendering
    // =========================================================================

    fn render_table(&mut self, table: &Table) {
        match table.source() {
            TableSource::Named { schema, name } => {
                if let Some(schema) = schema {
                    self.write_ident(schema);
                    self.write(".");
                }
                self.write_ident(name);
            }
            TableSource::Query(query) => {
                if table.is_lateral() {
                    self.keyword("lateral");
                    self.write(" ");
                }
                self.render_subquery(query);
            }
            TableSource::Cte(cte) => {
                let name = self.aliases.resolve(cte.id, cte.name.as_ref());
                self.write_ident(&name);
            }
        }

        self.write(" ");
        let alias = self.table_alias(table);
        self.write_ident(&alias);
    }

    fn render_join(&mut self, join: &Join) {
        self.keyword(join.kind.as_sql());
        self.write(" ");
        self.render_table(&join.table);

        if let Some(condition) = conjunction(&join.conditions) {
            self.write(" ");
            self.keyword("on");
            self.write(" ");
            self.render_condition(&condition);
        }
    }

    fn table_alias(&mut self, table: &Table) -> Ident {
        self.aliases.resolve(table.id(), table.alias())
    }

    fn window_name(&mut self, window: &Window) -> Ident {
        self.aliases.resolve(window.id(), window.name())
    }

    fn render_subquery(&mut self, query: &Query) {
        self.write("(");
        self.indent();
        self.soft_break();
        self.render_query(query);
        self.dedent();
        self.soft_break();
        self.write(")");
    }

    // =========================================================================
    // Expression rendering
    // =========================================================================

    /// Render a standalone expression, keeping its explicit names out of the
    /// generated aliases
    pub fn render_expr_root(&mut self, expr: &Expr) {
        self.aliases.reserve_expr(expr);
        self.render_condition(expr);
    }

    /// Render the root of a clause (WHERE, HAVING, ON or a standalone
    /// expression)
    pub fn render_condition(&mut self, expr: &Expr) {
        if self.config.strip_parentheses {
            self.render_bare(expr);
        } else {
            self.render_expr(expr);
        }
    }

    /// Render an expression in a context that supplies its own parentheses
    fn render_bare(&mut self, expr: &Expr) {
        match single_operand(expr) {
            Expr::Logical(node) => self.render_logical_operands(node),
            other => self.render_expr(other),
        }
    }

    /// Render a nested expression
    pub fn render_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(lit) => self.render_literal(lit),

            Expr::Placeholder(p) => self.render_placeholder(p),

            Expr::Column(col) => {
                if let Some(table) = &col.table {
                    let alias = self.table_alias(table);
                    self.write_ident(&alias);
                    self.write(".");
                }
                self.write_ident(&col.column);
            }

            Expr::Wildcard(table) => {
                if let Some(table) = table {
                    let alias = self.table_alias(table);
                    self.write_ident(&alias);
                    self.write(".");
                }
                self.write("*");
            }

            Expr::Arithmetic(node) => {
                self.render_arithmetic_operand(&node.left, node.op, false);
                self.write(" ");
                self.write(node.op.as_sql());
                self.write(" ");
                self.render_arithmetic_operand(&node.right, node.op, true);
            }

            Expr::Comparison { left, op, right } => {
                self.render_operand(left);
                self.write(" ");
                self.write(op.as_sql());
                self.write(" ");
                self.render_operand(right);
            }

            Expr::Quantified { quantifier, query } => {
                self.keyword(quantifier.as_sql());
                self.write(" ");
                self.render_subquery(query);
            }

            Expr::Logical(node) => {
                if let [sole] = node.operands() {
                    self.render_expr(sole);
                } else {
                    self.write("(");
                    self.render_logical_operands(node);
                    self.write(")");
                }
            }

            Expr::Not(inner) => {
                self.keyword("not");
                let inner = single_operand(inner);
                if is_atom(inner) {
                    self.write(" ");
                    self.render_expr(inner);
                } else {
                    self.write(" (");
                    self.render_bare(inner);
                    self.write(")");
                }
            }

            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                self.render_operand(expr);
                self.write(" ");
                self.keyword(if *negated { "not between" } else { "between" });
                self.write(" ");
                self.render_operand(low);
                self.write(" ");
                self.keyword("and");
                self.write(" ");
                self.render_operand(high);
            }

            Expr::InList {
                expr,
                list,
                negated,
            } => {
                self.render_operand(expr);
                self.write(" ");
                self.keyword(if *negated { "not in" } else { "in" });
                self.write(" (");
                self.render_expr_list(list);
                self.write(")");
            }

            Expr::InQuery {
                expr,
                query,
                negated,
            } => {
                self.render_operand(expr);
                self.write(" ");
                self.keyword(if *negated { "not in" } else { "in" });
                self.write(" ");
                self.render_subquery(query);
            }

            Expr::Like {
                expr,
                pattern,
                escape,
                negated,
            } => {
                self.render_operand(expr);
                self.write(" ");
                self.keyword(if *negated { "not like" } else { "like" });
                self.write(" ");
                self.render_operand(pattern);
                if let Some(c) = escape {
                    self.write(" ");
                    self.render_escape(*c);
                }
            }

            Expr::IsNull { expr, negated } => {
                self.render_operand(expr);
                self.write(" ");
                self.keyword(if *negated { "is not null" } else { "is null" });
            }

            Expr::Exists { query, negated } => {
                self.keyword(if *negated { "not exists" } else { "exists" });
                self.write(" ");
                self.render_subquery(query);
            }

            Expr::Case(case) => self.render_case(case),

            Expr::Cast { expr, target_type } => {
                self.keyword("cast");
                self.write("(");
                self.render_bare(expr);
                self.write(" ");
                self.keyword("as");
                self.write(" ");
                self.render_type(target_type);
                self.write(")");
            }

            Expr::Collate { expr, collation } => {
                let operand = single_operand(expr);
                self.render_wrapped(operand, !is_atom(operand));
                self.write(" ");
                self.keyword("collate");
                self.write(" ");
                self.write_ident(collation);
            }

            Expr::Function(call) => self.render_function_call(call),

            Expr::WindowFunction { function, window } => {
                self.render_function_call(function);
                self.write(" ");
                self.keyword("over");
                self.write(" ");
                if self.is_declared(window) {
                    let name = self.window_name(window);
                    self.write_ident(&name);
                } else {
                    self.write("(");
                    self.render_window_spec(window);
                    self.write(")");
                }
            }

            Expr::Subquery(query) => self.render_subquery(query),

            Expr::Grouping(inner) => {
                self.write("(");
                self.render_bare(inner);
                self.write(")");
            }
        }
    }

    fn render_logical_operands(&mut self, node: &LogicalExpr) {
        for (i, operand) in node.operands().iter().enumerate() {
            if i > 0 {
                self.write(" ");
                self.keyword(node.op().as_sql());
                self.write(" ");
            }
            self.render_expr(operand);
        }
    }

    /// Operand of an arithmetic node; wrapped only when the tiers require it
    fn render_arithmetic_operand(&mut self, child: &Expr, parent: ArithmeticOperator, is_right: bool) {
        let child = single_operand(child);
        let wrap = match child {
            Expr::Arithmetic(node) => {
                node.op.tier() > parent.tier()
                    || (is_right && node.op.tier() == parent.tier())
                    || mixes_concat(node.op, parent)
            }
            other => is_predicate(other),
        };
        self.render_wrapped(child, wrap);
    }

    /// Operand of a comparison or predicate
    fn render_operand(&mut self, expr: &Expr) {
        let expr = single_operand(expr);
        self.render_wrapped(expr, is_predicate(expr));
    }

    fn render_wrapped(&mut self, expr: &Expr, wrap: bool) {
        if wrap {
            self.write("(");
            self.render_bare(expr);
            self.write(")");
        } else {
            self.render_expr(expr);
        }
    }

    fn render_placeholder(&mut self, placeholder: &Placeholder) {
        self.placeholders += 1;
        let marker = self.config.marker.marker(self.placeholders, placeholder);
        self.write(&marker);
    }

    fn render_literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Null => self.keyword("null"),
            Literal::Bool(b) => self.keyword(if *b { "true" } else { "false" }),
            Literal::Integer(n) => self.write(&n.to_string()),
            Literal::Float(f) if f.is_nan() => self.write_literal("NaN"),
            Literal::Float(f) if f.is_infinite() => {
                self.write_literal(if *f > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Literal::Float(f) => self.write(&format!("{:?}", f)),
            Literal::String(s) => self.write_literal(s),
            Literal::Date(d) => {
                let text = d.format("%Y-%m-%d").to_string();
                self.render_escaped_literal("d", &text);
            }
            Literal::Timestamp(ts) => {
                let mut text = ts.format("%Y-%m-%d %H:%M:%S").to_string();
                let nanos = ts.nanosecond() % 1_000_000_000;
                if nanos != 0 {
                    let fraction = format!("{:09}", nanos);
                    text.push('.');
                    text.push_str(fraction.trim_end_matches('0'));
                }
                self.render_escaped_literal("ts", &text);
            }
        }
    }

    /// `{kind 'text'}` with escape notation, `'text'` without
    fn render_escaped_literal(&mut self, kind: &str, text: &str) {
        if self.config.use_escape_notation {
            self.write("{");
            self.keyword(kind);
            self.write(" ");
            self.write_literal(text);
            self.write("}");
        } else {
            self.write_literal(text);
        }
    }

    fn render_escape(&mut self, c: char) {
        let text = c.to_string();
        if self.config.use_escape_notation {
            self.render_escaped_literal("escape", &text);
        } else {
            self.keyword("escape");
            self.write(" ");
            self.write_literal(&text);
        }
    }

    fn render_function_call(&mut self, call: &FunctionCall) {
        if let Some(schema) = &call.schema {
            self.write_ident(schema);
            self.write(".");
        }
        self.keyword(call.name.as_str());
        self.write("(");
        if call.distinct {
            self.keyword("distinct");
            self.write(" ");
        }
        self.render_expr_list(&call.args);
        self.write(")");
    }

    fn render_case(&mut self, case: &CaseExpr) {
        self.keyword("case");

        if let Some(operand) = &case.operand {
            self.write(" ");
            self.render_operand(operand);
        }

        for (when_expr, then_expr) in &case.when_clauses {
            self.write(" ");
            self.keyword("when");
            self.write(" ");
            self.render_bare(when_expr);
            self.write(" ");
            self.keyword("then");
            self.write(" ");
            self.render_bare(then_expr);
        }

        if let Some(else_clause) = &case.else_clause {
            self.write(" ");
            self.keyword("else");
            self.write(" ");
            self.render_bare(else_clause);
        }

        self.write(" ");
        self.keyword("end");
    }

    // =========================================================================
    // Window rendering
    // =========================================================================

    fn is_declared(&self, window: &Window) -> bool {
        self.window_scopes
            .last()
            .is_some_and(|scope| scope.contains(&window.id()))
    }

    /// The parenthesized part of a window: base, partitioning, ordering, frame
    fn render_window_spec(&mut self, window: &Window) {
        let mut parts = 0;

        if let Some(base) = window.base() {
            let name = self.window_name(base);
            self.write_ident(&name);
            parts += 1;
        }

        if !window.partitions().is_empty() {
            if parts > 0 {
                self.write(" ");
            }
            self.keyword("partition by");
            self.write(" ");
            self.render_expr_list(window.partitions());
            parts += 1;
        }

        if !window.orderings().is_empty() {
            if parts > 0 {
                self.write(" ");
            }
            self.keyword("order by");
            self.write(" ");
            self.render_order_by(window.orderings());
            parts += 1;
        }

        if let Some(frame) = window.frame() {
            if parts > 0 {
                self.write(" ");
            }
            self.render_frame(frame);
        }
    }

    fn render_frame(&mut self, frame: &Frame) {
        self.keyword(frame.units.as_sql());
        self.write(" ");
        match &frame.end {
            Some(end) => {
                self.keyword("between");
                self.write(" ");
                self.render_frame_bound(&frame.start);
                self.write(" ");
                self.keyword("and");
                self.write(" ");
                self.render_frame_bound(end);
            }
            None => self.render_frame_bound(&frame.start),
        }
    }

    fn render_frame_bound(&mut self, bound: &FrameBound) {
        if let Some(offset) = bound.offset() {
            self.render_operand(offset);
            self.write(" ");
        }
        self.keyword(match bound.kind() {
            BoundKind::UnboundedPreceding => "unbounded preceding",
            BoundKind::Preceding => "preceding",
            BoundKind::CurrentRow => "current row",
            BoundKind::Following => "following",
            BoundKind::UnboundedFollowing => "unbounded following",
        });
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn render_select_columns(&mut self, columns: &[SelectItem]) {
        if columns.is_empty() {
            self.write("*");
            return;
        }
        for (i, item) in columns.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.render_expr(&item.expr);
            if let Some(alias) = &item.alias {
                self.write(" ");
                self.keyword("as");
                self.write(" ");
                self.write_ident(alias);
            }
        }
    }

    fn render_expr_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.render_expr(expr);
        }
    }

    fn render_order_by(&mut self, order_by: &[OrderByExpr]) {
        for (i, ob) in order_by.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.render_expr(&ob.expr);
            if let Some(dir) = &ob.direction {
                self.write(" ");
                self.keyword(dir.as_sql());
            }
            if let Some(nulls) = &ob.nulls {
                self.write(" ");
                self.keyword(nulls.as_sql());
            }
        }
    }

    fn render_type(&mut self, sql_type: &SqlType) {
        match &sql_type.name {
            TypeName::Builtin(ty) => self.keyword(ty.as_sql()),
            TypeName::Custom { schema, name } => {
                if let Some(schema) = schema {
                    self.write_ident(schema);
                    self.write(".");
                }
                self.write_ident(name);
            }
        }
        self.write(&sql_type.suffix());
    }

    // =========================================================================
    // Low-level output methods
    // =========================================================================

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn keyword(&mut self, kw: &str) {
        let kw = self.config.keyword_case.apply(kw);
        self.output.push_str(&kw);
    }

    fn write_ident(&mut self, ident: &Ident) {
        let name = self.config.identifier_case.apply(ident.as_str());
        let delimiter = self.config.identifier_delimiter.as_str();
        if delimiter.is_empty() {
            self.output.push_str(&name);
            return;
        }
        self.output.push_str(delimiter);
        // Escape any embedded delimiter by doubling it
        self.output
            .push_str(&name.replace(delimiter, &delimiter.repeat(2)));
        self.output.push_str(delimiter);
    }

    fn write_literal(&mut self, s: &str) {
        self.output.push('\'');
        self.output.push_str(&s.replace('\'', "''"));
        self.output.push('\'');
    }

    /// Clause separator: a space, or a line break when pretty-printing
    fn newline(&mut self) {
        if self.config.is_pretty() {
            self.output.push_str(&self.config.newline);
            for _ in 0..self.indent_level {
                self.output.push_str(&self.config.indent);
            }
        } else {
            self.output.push(' ');
        }
    }

    /// Line break inside parentheses; nothing in compact output
    fn soft_break(&mut self) {
        if self.config.is_pretty() {
            self.newline();
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }
}

/// Look through single-operand logical nodes
fn single_operand(expr: &Expr) -> &Expr {
    match expr {
        Expr::Logical(node) => match node.operands() {
            [sole] => single_operand(sole),
            _ => expr,
        },
        _ => expr,
    }
}

/// Predicate-level expressions; wrapped when used as an operand
fn is_predicate(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Comparison { .. }
            | Expr::Between { .. }
            | Expr::InList { .. }
            | Expr::InQuery { .. }
            | Expr::Like { .. }
            | Expr::IsNull { .. }
            | Expr::Not(_)
    )
}

/// `||` next to `+`/`-`: same tier, but Postgres binds `+` and `-` tighter
fn mixes_concat(child: ArithmeticOperator, parent: ArithmeticOperator) -> bool {
    use ArithmeticOperator::{Concat, Minus, Plus};
    matches!(
        (child, parent),
        (Concat, Plus | Minus) | (Plus | Minus, Concat)
    )
}

/// Expressions that never need parentheses after `not`
fn is_atom(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Literal(_)
            | Expr::Placeholder(_)
            | Expr::Column(_)
            | Expr::Wildcard(_)
            | Expr::Function(_)
            | Expr::WindowFunction { .. }
            | Expr::Subquery(_)
            | Expr::Grouping(_)
            | Expr::Exists { .. }
            | Expr::Case(_)
            | Expr::Cast { .. }
    )
}

// =========================================================================
// Convenience functions
// =========================================================================

/// Render a statement with the default configuration
pub fn render(stmt: &Stmt) -> String {
    render_with(stmt, &RenderConfig::default())
}

/// Render a statement with the given configuration
pub fn render_with(stmt: &Stmt, config: &RenderConfig) -> String {
    telemetry::traced("statement", || {
        let capacity = SqlRenderer::estimate_capacity(stmt);
        let mut renderer = SqlRenderer::with_capacity(config, capacity);
        renderer.render_stmt(stmt);
        renderer.into_sql()
    })
}

/// Render a statement one clause per line
pub fn render_pretty(stmt: &Stmt) -> String {
    render_with(stmt, &RenderConfig::pretty())
}

/// Render just an expression with the default configuration
pub fn render_expr(expr: &Expr) -> String {
    render_expr_with(expr, &RenderConfig::default())
}

/// Render just an expression with the given configuration
pub fn render_expr_with(expr: &Expr, config: &RenderConfig) -> String {
    telemetry::traced("expression", || {
        let mut renderer = SqlRenderer::new(config);
        renderer.render_expr_root(expr);
        renderer.into_sql()
    })
}
