//! Table references and joins
//!
//! A [`Table`] is a cheap-clone handle. Every clone refers to the same node,
//! so a table used in the FROM list and in a dozen column references renders
//! with one alias. Two tables built separately are distinct even when they
//! name the same relation, which is what makes self-joins work.

use super::expr::{ColumnRef, Expr, Ident, IntoExpr};
use super::node::NodeId;
use super::stmt::Query;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Where a table's rows come from
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// A named relation: schema.name
    Named { schema: Option<Ident>, name: Ident },
    /// A derived table: (SELECT ...) alias
    Query(Box<Query>),
    /// A reference to a CTE defined in an enclosing WITH clause
    Cte(CteRef),
}

/// Pointer back to a CTE definition
///
/// Holds only the CTE's identity and explicit name. An unnamed CTE is named
/// when its definition is rendered and the reference resolves to the same
/// name through the render's alias table.
#[derive(Debug, Clone, PartialEq)]
pub struct CteRef {
    pub id: NodeId,
    pub name: Option<Ident>,
}

#[derive(Debug, Clone)]
struct TableNode {
    id: NodeId,
    source: TableSource,
    alias: Option<Ident>,
    lateral: bool,
}

/// A table reference with a stable identity
#[derive(Debug, Clone)]
pub struct Table {
    inner: Arc<TableNode>,
}

impl Table {
    fn from_source(source: TableSource) -> Self {
        Self {
            inner: Arc::new(TableNode {
                id: NodeId::next(),
                source,
                alias: None,
                lateral: false,
            }),
        }
    }

    /// Create a reference to a named table
    pub fn named(name: impl Into<Ident>) -> Self {
        Self::from_source(TableSource::Named {
            schema: None,
            name: name.into(),
        })
    }

    /// Create a reference to a named table, rejecting an empty name
    pub fn try_named(name: impl Into<String>) -> Result<Self> {
        let name = Ident::try_new(name).map_err(|_| Error::null_argument("table name"))?;
        Ok(Self::named(name))
    }

    /// Create a derived table backed by a sub-query
    pub fn from_query(query: impl Into<Query>) -> Self {
        Self::from_source(TableSource::Query(Box::new(query.into())))
    }

    pub(crate) fn from_cte(cte: CteRef) -> Self {
        Self::from_source(TableSource::Cte(cte))
    }

    /// Apply a change, cloning into a fresh node if this one is shared
    fn modify(self, f: impl FnOnce(&mut TableNode)) -> Self {
        let node = match Arc::try_unwrap(self.inner) {
            Ok(mut node) => {
                f(&mut node);
                node
            }
            Err(shared) => {
                let mut node = (*shared).clone();
                node.id = NodeId::next();
                f(&mut node);
                node
            }
        };
        Self {
            inner: Arc::new(node),
        }
    }

    /// Set an explicit alias, bypassing the allocator
    pub fn with_alias(self, alias: impl Into<Ident>) -> Self {
        let alias = alias.into();
        self.modify(|node| node.alias = Some(alias))
    }

    /// Qualify a named table with a schema
    ///
    /// Has no effect on derived tables and CTE references.
    pub fn with_schema(self, schema: impl Into<Ident>) -> Self {
        let schema = schema.into();
        self.modify(|node| {
            if let TableSource::Named { schema: s, .. } = &mut node.source {
                *s = Some(schema);
            }
        })
    }

    /// Mark a derived table as LATERAL
    pub fn lateral(self) -> Self {
        self.modify(|node| node.lateral = true)
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    pub fn source(&self) -> &TableSource {
        &self.inner.source
    }

    pub fn alias(&self) -> Option<&Ident> {
        self.inner.alias.as_ref()
    }

    pub fn is_lateral(&self) -> bool {
        self.inner.lateral
    }

    /// The relation name, if this is a named table
    pub fn name(&self) -> Option<&Ident> {
        match &self.inner.source {
            TableSource::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Column reference owned by this table
    pub fn column(&self, name: impl Into<Ident>) -> ColumnRef {
        ColumnRef::of(self, name)
    }

    /// Column expression owned by this table: `alias.name`
    pub fn col(&self, name: impl Into<Ident>) -> Expr {
        Expr::Column(self.column(name))
    }

    /// `alias.*`
    pub fn wildcard(&self) -> Expr {
        Expr::Wildcard(Some(self.clone()))
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Table {}

impl From<&str> for Table {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

/// Kind of join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Inner => "inner join",
            Self::Left => "left join",
            Self::Right => "right join",
            Self::Full => "full join",
            Self::Cross => "cross join",
        }
    }
}

/// A JOIN clause attached to a select
///
/// Conditions are AND-combined when rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinType,
    pub table: Table,
    pub conditions: Vec<Expr>,
}

impl Join {
    /// Join `table` on `left = right`
    pub fn new(kind: JoinType, table: &Table, left: impl IntoExpr, right: impl IntoExpr) -> Self {
        Self {
            kind,
            table: table.clone(),
            conditions: vec![left.into_expr().eq(right)],
        }
    }

    /// Join `table` on an arbitrary condition
    pub fn on(kind: JoinType, table: &Table, condition: impl IntoExpr) -> Self {
        Self {
            kind,
            table: table.clone(),
            conditions: vec![condition.into_expr()],
        }
    }

    pub fn inner(table: &Table, left: impl IntoExpr, right: impl IntoExpr) -> Self {
        Self::new(JoinType::Inner, table, left, right)
    }

    pub fn left(table: &Table, left: impl IntoExpr, right: impl IntoExpr) -> Self {
        Self::new(JoinType::Left, table, left, right)
    }

    /// CROSS JOIN without conditions
    pub fn cross(table: &Table) -> Self {
        Self {
            kind: JoinType::Cross,
            table: table.clone(),
            conditions: Vec::new(),
        }
    }

    /// Append another join condition
    pub fn and(mut self, condition: impl IntoExpr) -> Self {
        self.conditions.push(condition.into_expr());
        self
    }
}
