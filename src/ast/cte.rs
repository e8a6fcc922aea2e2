//! Common Table Expression (CTE) support
//!
//! A [`Cte`] is defined once in a WITH clause and referenced elsewhere in the
//! same statement through its [`Table`] view.

use super::expr::Ident;
use super::node::NodeId;
use super::stmt::Query;
use super::table::{CteRef, Table};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct CteNode {
    id: NodeId,
    name: Option<Ident>,
    columns: Option<Vec<Ident>>,
    query: Query,
    table: Table,
}

/// A Common Table Expression (CTE) in a WITH clause
#[derive(Debug, Clone)]
pub struct Cte {
    inner: Arc<CteNode>,
}

impl Cte {
    /// Create an unnamed CTE; the name is allocated at render time
    pub fn new(query: impl Into<Query>) -> Self {
        Self::build(None, query.into())
    }

    /// Create a CTE with an explicit name
    pub fn named(name: impl Into<Ident>, query: impl Into<Query>) -> Self {
        Self::build(Some(name.into()), query.into())
    }

    fn build(name: Option<Ident>, query: Query) -> Self {
        let id = NodeId::next();
        let table = Table::from_cte(CteRef {
            id,
            name: name.clone(),
        });
        Self {
            inner: Arc::new(CteNode {
                id,
                name,
                columns: None,
                query,
                table,
            }),
        }
    }

    /// Add column aliases to the CTE
    pub fn with_columns<I, T>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Ident>,
    {
        let columns: Vec<Ident> = columns.into_iter().map(Into::into).collect();
        match Arc::try_unwrap(self.inner) {
            Ok(mut node) => {
                node.columns = Some(columns);
                Self {
                    inner: Arc::new(node),
                }
            }
            Err(shared) => {
                let forked = Self::build(shared.name.clone(), shared.query.clone());
                forked.with_columns(columns)
            }
        }
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    pub fn name(&self) -> Option<&Ident> {
        self.inner.name.as_ref()
    }

    pub fn columns(&self) -> Option<&[Ident]> {
        self.inner.columns.as_deref()
    }

    pub fn query(&self) -> &Query {
        &self.inner.query
    }

    /// The CTE as a table, with a fixed identity
    ///
    /// Every call returns the same table, so all uses share one alias.
    pub fn table(&self) -> Table {
        self.inner.table.clone()
    }

    /// A fresh table over this CTE with its own alias, for self-joins
    pub fn reference(&self) -> Table {
        Table::from_cte(CteRef {
            id: self.inner.id,
            name: self.inner.name.clone(),
        })
    }
}

impl PartialEq for Cte {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}
