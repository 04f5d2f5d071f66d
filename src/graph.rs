//! The lazy, immutable computation graph.
//!
//! A [`Graph`] is a handle to one node; the node holds its operation and its parents.
//! Builder methods never mutate the receiver: each returns a new handle whose node points
//! back at the receiver, so one graph can feed several children.
//!
//! ```
//! use rowgraph::{Bindings, Graph, row};
//! use rowgraph::mappers::{LowerCase, Split};
//! use rowgraph::reducers::Count;
//!
//! # fn main() -> rowgraph::Result<()> {
//! let counts = Graph::from_source("docs")
//!     .map(LowerCase::new("text"))
//!     .map(Split::new("text"))
//!     .sort(&["text"])
//!     .reduce(Count::new("count"), &["text"]);
//!
//! let bindings = Bindings::new().bind_rows("docs", vec![row! { "text" => "A a b" }]);
//! let rows: Vec<_> = counts.run(&bindings)?.collect::<rowgraph::Result<_>>()?;
//! assert_eq!(rows.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! Reduce and Join require key-contiguous input and do not sort on their own. Put a
//! [`sort`](Graph::sort) on the same keys in front of them unless the input is already
//! grouped; [`explain`](Graph::explain) flags the places where that cannot be proven.

use crate::config::SortConfig;
use crate::error::Result;
use crate::io::jsonl;
use crate::node::{Joiner, LineParser, Mapper, Node, Reducer, Source};
use crate::node_id::NodeId;
use crate::plan::{self, Explanation};
use crate::runner::{self, Bindings};
use crate::stream::RowStream;
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) struct GraphNode {
    pub(crate) id: NodeId,
    pub(crate) node: Node,
    pub(crate) parents: Vec<Graph>,
}

/// Handle to a node of a computation graph. Cloning is cheap and shares the node.
#[derive(Clone)]
pub struct Graph(pub(crate) Arc<GraphNode>);

fn key_list(keys: &[&str]) -> Arc<[String]> {
    keys.iter().map(|k| (*k).to_string()).collect()
}

impl Graph {
    fn node(node: Node, parents: Vec<Graph>) -> Self {
        Graph(Arc::new(GraphNode {
            id: NodeId::next(),
            node,
            parents,
        }))
    }

    /// Rows come from the binding named `name`, supplied to [`run`](Self::run).
    #[must_use]
    pub fn from_source(name: impl Into<String>) -> Self {
        Self::node(Node::Source(Source::Named(name.into())), Vec::new())
    }

    /// Rows come from a text file, one row per non-blank line.
    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>, parser: LineParser) -> Self {
        Self::node(
            Node::Source(Source::File {
                path: path.into(),
                parser,
            }),
            Vec::new(),
        )
    }

    /// Rows come from a JSON-lines file (optionally gzip or zstd compressed).
    #[must_use]
    pub fn from_jsonl(path: impl Into<PathBuf>) -> Self {
        Self::from_file(path, jsonl::parser())
    }

    /// Apply `mapper` to every row.
    #[must_use]
    pub fn map(&self, mapper: impl Mapper + 'static) -> Self {
        Self::node(Node::Map(Arc::new(mapper)), vec![self.clone()])
    }

    /// Apply `reducer` to every run of adjacent rows with equal `keys`.
    #[must_use]
    pub fn reduce(&self, reducer: impl Reducer + 'static, keys: &[&str]) -> Self {
        Self::node(
            Node::Reduce {
                reducer: Arc::new(reducer),
                keys: key_list(keys),
            },
            vec![self.clone()],
        )
    }

    /// Stable sort by `keys`, using the run-wide [`SortConfig`].
    #[must_use]
    pub fn sort(&self, keys: &[&str]) -> Self {
        self.sort_node(keys, None)
    }

    /// Stable sort by `keys` with its own memory bound and spill directory.
    #[must_use]
    pub fn sort_with(&self, keys: &[&str], config: SortConfig) -> Self {
        self.sort_node(keys, Some(config))
    }

    fn sort_node(&self, keys: &[&str], config: Option<SortConfig>) -> Self {
        Self::node(
            Node::Sort {
                keys: key_list(keys),
                config,
            },
            vec![self.clone()],
        )
    }

    /// Merge-join this graph (left) with `right` on `keys`.
    ///
    /// Both inputs must be grouped by `keys` in the same order.
    #[must_use]
    pub fn join(&self, joiner: impl Joiner + 'static, right: &Graph, keys: &[&str]) -> Self {
        Self::node(
            Node::Join {
                joiner: Arc::new(joiner),
                keys: key_list(keys),
            },
            vec![self.clone(), right.clone()],
        )
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.0.id
    }

    /// The operation held by this node.
    #[must_use]
    pub fn operation(&self) -> &Node {
        &self.0.node
    }

    /// Upstream graphs: none for a source, two (left, right) for a join, one otherwise.
    #[must_use]
    pub fn parents(&self) -> &[Graph] {
        &self.0.parents
    }

    /// Describe the graph as an indented plan, flagging grouped operations whose input is
    /// not provably grouped on their keys.
    #[must_use]
    pub fn explain(&self) -> Explanation {
        plan::explain(self)
    }

    /// Execute the graph against `bindings`.
    ///
    /// Fails up front when a named source has no binding. Otherwise returns a lazy stream:
    /// no row is read until the stream is pulled, and every call re-executes from the
    /// sources.
    pub fn run(&self, bindings: &Bindings) -> Result<RowStream> {
        for step in self.explain().ungrouped() {
            tracing::warn!(node = %step.id, op = %step.label, "grouped operation over input not provably grouped on its keys");
        }
        runner::execute(self, bindings)
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Graph({} {:?})", self.0.id, self.0.node)
    }
}
