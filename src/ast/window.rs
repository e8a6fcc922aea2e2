//! Window definitions and frames
//!
//! Like tables, windows are shared handles with a stable identity. A window
//! listed in a select's WINDOW clause is referenced by name from every window
//! function that uses it; any other window is rendered inline.

use super::expr::{Expr, Ident, IntoExpr, OrderByExpr};
use super::node::NodeId;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Frame units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnits {
    Rows,
    Range,
    Groups,
}

impl FrameUnits {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Rows => "rows",
            Self::Range => "range",
            Self::Groups => "groups",
        }
    }
}

/// Kind of frame bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    UnboundedPreceding,
    Preceding,
    CurrentRow,
    Following,
    UnboundedFollowing,
}

impl BoundKind {
    /// Whether the bound needs an offset expression
    pub fn requires_offset(&self) -> bool {
        matches!(self, Self::Preceding | Self::Following)
    }
}

/// One end of a window frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBound {
    kind: BoundKind,
    offset: Option<Box<Expr>>,
}

impl FrameBound {
    /// Create a bound; PRECEDING and FOLLOWING need an offset
    pub fn new(kind: BoundKind, offset: Option<Expr>) -> Result<Self> {
        if kind.requires_offset() && offset.is_none() {
            return Err(Error::missing_clause(match kind {
                BoundKind::Preceding => "preceding offset",
                _ => "following offset",
            }));
        }
        Ok(Self {
            kind,
            offset: offset.filter(|_| kind.requires_offset()).map(Box::new),
        })
    }

    pub fn unbounded_preceding() -> Self {
        Self {
            kind: BoundKind::UnboundedPreceding,
            offset: None,
        }
    }

    pub fn preceding(offset: impl IntoExpr) -> Self {
        Self {
            kind: BoundKind::Preceding,
            offset: Some(Box::new(offset.into_expr())),
        }
    }

    pub fn current_row() -> Self {
        Self {
            kind: BoundKind::CurrentRow,
            offset: None,
        }
    }

    pub fn following(offset: impl IntoExpr) -> Self {
        Self {
            kind: BoundKind::Following,
            offset: Some(Box::new(offset.into_expr())),
        }
    }

    pub fn unbounded_following() -> Self {
        Self {
            kind: BoundKind::UnboundedFollowing,
            offset: None,
        }
    }

    pub fn kind(&self) -> BoundKind {
        self.kind
    }

    pub fn offset(&self) -> Option<&Expr> {
        self.offset.as_deref()
    }
}

/// Window frame: `<units> <start>` or `<units> between <start> and <end>`
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub units: FrameUnits,
    pub start: FrameBound,
    pub end: Option<FrameBound>,
}

impl Frame {
    pub fn new(units: FrameUnits, start: FrameBound) -> Self {
        Self {
            units,
            start,
            end: None,
        }
    }

    pub fn between(units: FrameUnits, start: FrameBound, end: FrameBound) -> Self {
        Self {
            units,
            start,
            end: Some(end),
        }
    }
}

#[derive(Debug, Clone)]
struct WindowNode {
    id: NodeId,
    name: Option<Ident>,
    base: Option<Window>,
    partition_by: Vec<Expr>,
    order_by: Vec<OrderByExpr>,
    frame: Option<Frame>,
}

/// A window specification with a stable identity
#[derive(Debug, Clone)]
pub struct Window {
    inner: Arc<WindowNode>,
}

impl Window {
    /// Create an empty, unnamed window
    pub fn new() -> Self {
        Self {
            inner: Arc::new(WindowNode {
                id: NodeId::next(),
                name: None,
                base: None,
                partition_by: Vec::new(),
                order_by: Vec::new(),
                frame: None,
            }),
        }
    }

    /// Create an empty window with an explicit name
    pub fn named(name: impl Into<Ident>) -> Self {
        Self::new().with_name(name)
    }

    fn modify(self, f: impl FnOnce(&mut WindowNode)) -> Self {
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

    pub fn with_name(self, name: impl Into<Ident>) -> Self {
        let name = name.into();
        self.modify(|node| node.name = Some(name))
    }

    /// Build on top of another (named) window
    pub fn with_base(self, base: &Window) -> Self {
        let base = base.clone();
        self.modify(|node| node.base = Some(base))
    }

    /// Append a PARTITION BY expression
    pub fn partition_by(self, expr: impl IntoExpr) -> Self {
        let expr = expr.into_expr();
        self.modify(|node| node.partition_by.push(expr))
    }

    /// Append an ORDER BY item
    pub fn order_by(self, order: OrderByExpr) -> Self {
        self.modify(|node| node.order_by.push(order))
    }

    pub fn with_frame(self, frame: Frame) -> Self {
        self.modify(|node| node.frame = Some(frame))
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    pub fn name(&self) -> Option<&Ident> {
        self.inner.name.as_ref()
    }

    pub fn base(&self) -> Option<&Window> {
        self.inner.base.as_ref()
    }

    pub fn partitions(&self) -> &[Expr] {
        &self.inner.partition_by
    }

    pub fn orderings(&self) -> &[OrderByExpr] {
        &self.inner.order_by
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.inner.frame.as_ref()
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}
