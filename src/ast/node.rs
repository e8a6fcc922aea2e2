//! Stable node identity
//!
//! Tables, CTEs, windows and placeholders can be referenced from several
//! places in one tree. The renderer needs to know when two references point
//! at the *same* node (to reuse an alias) as opposed to two nodes that merely
//! look alike, so each of those nodes gets a [`NodeId`] when it is created.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier assigned to a shareable node at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    /// Allocate a fresh identifier
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw identifier value
    #[inline]
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
