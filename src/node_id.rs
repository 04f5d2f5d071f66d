//! Process-unique identifiers for graph nodes.
//!
//! Every node created by a [`Graph`](crate::Graph) builder gets the next `NodeId`. Ids
//! label nodes in [`Graph::explain`](crate::Graph::explain) output and logs, and let a
//! plan recognize a node that is shared by several children.

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique numeric identifier for a node in a graph.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Return the underlying numeric value.
    #[must_use]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "#{}", self.0)
    }
}
