//! Stage contracts and the operation carried by each graph node.
//!
//! The three user-facing contracts are [`Mapper`], [`Reducer`] and [`Joiner`]. The graph
//! wraps them in a [`Node`], which is the closed set of operations the runner knows how to
//! turn into a stream-to-stream transform.

use crate::config::SortConfig;
use crate::error::Result;
use crate::row::Row;
use crate::stream::RowStream;
use std::fmt::{Debug, Formatter, Result as FormatResult};
use std::path::PathBuf;
use std::sync::Arc;

/// Row → zero or more rows, independently per row.
///
/// Filtering emits nothing, fan-out emits many, pass-through emits the row itself.
pub trait Mapper: Send + Sync {
    fn apply(&self, row: Row) -> RowStream;

    /// Short label used by [`Graph::explain`](crate::Graph::explain).
    fn name(&self) -> &'static str {
        "mapper"
    }
}

/// One run of rows sharing a key → zero or more rows.
///
/// `group` is never empty and every row in it has the same values for `keys`.
pub trait Reducer: Send + Sync {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> RowStream;

    fn name(&self) -> &'static str {
        "reducer"
    }
}

/// Two runs sharing a key (either may be empty, never both) → joined rows.
pub trait Joiner: Send + Sync {
    fn join(&self, keys: &[String], left: Vec<Row>, right: Vec<Row>) -> RowStream;

    fn name(&self) -> &'static str {
        "joiner"
    }
}

/// Parses one line of a file source into a row.
pub type LineParser = Arc<dyn Fn(&str) -> std::result::Result<Row, String> + Send + Sync>;

/// Where a source node gets its rows.
#[derive(Clone)]
pub enum Source {
    /// Resolved against the bindings passed to `run`.
    Named(String),
    /// Read line by line, each line parsed into a row.
    File { path: PathBuf, parser: LineParser },
}

/// The operation held by a graph node.
#[derive(Clone)]
pub enum Node {
    Source(Source),
    Map(Arc<dyn Mapper>),
    Reduce {
        reducer: Arc<dyn Reducer>,
        keys: Arc<[String]>,
    },
    /// `config: None` defers to the run-wide default in the bindings.
    Sort {
        keys: Arc<[String]>,
        config: Option<SortConfig>,
    },
    Join {
        joiner: Arc<dyn Joiner>,
        keys: Arc<[String]>,
    },
}

impl Node {
    /// Keys the operation groups or orders by, if any.
    #[must_use]
    pub fn keys(&self) -> Option<&[String]> {
        match self {
            Node::Reduce { keys, .. } | Node::Sort { keys, .. } | Node::Join { keys, .. } => {
                Some(keys)
            }
            Node::Source(_) | Node::Map(_) => None,
        }
    }

    /// Whether the operation requires key-contiguous input.
    #[must_use]
    pub fn is_grouped(&self) -> bool {
        matches!(self, Node::Reduce { .. } | Node::Join { .. })
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Node::Source(Source::Named(name)) => write!(f, "Source({name})"),
            Node::Source(Source::File { path, .. }) => write!(f, "ReadFile({})", path.display()),
            Node::Map(m) => write!(f, "Map({})", m.name()),
            Node::Reduce { reducer, keys } => write!(f, "Reduce({}, {keys:?})", reducer.name()),
            Node::Sort { keys, .. } => write!(f, "Sort({keys:?})"),
            Node::Join { joiner, keys } => write!(f, "Join({}, {keys:?})", joiner.name()),
        }
    }
}

/// Adapter so closures can be used as mappers.
pub struct FnMapper<F>(pub F);

impl<F> Mapper for FnMapper<F>
where
    F: Fn(Row) -> Result<Vec<Row>> + Send + Sync,
{
    fn apply(&self, row: Row) -> RowStream {
        match (self.0)(row) {
            Ok(rows) => crate::stream::from_rows(rows),
            Err(e) => crate::stream::failed(e),
        }
    }

    fn name(&self) -> &'static str {
        "fn"
    }
}
