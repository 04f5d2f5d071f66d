//! Source bindings and recursive graph execution.
//!
//! Executing a node first executes its parents, then wraps their streams in the node's
//! own stream adapter. The result is a chain of lazy iterators: building it touches no
//! rows, and pulling from it drives the whole graph one row at a time.

use crate::config::SortConfig;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::io;
use crate::joins::merge_join;
use crate::node::{Node, Source};
use crate::row::Row;
use crate::sort::external_sort;
use crate::stream::{self, RowStream, Run, Runs, flat_map_ok};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FormatResult};
use std::sync::Arc;

/// Produces a fresh stream for a named source each time a run needs one.
pub type SourceFn = Arc<dyn Fn() -> RowStream + Send + Sync>;

/// Named sources and run-wide settings passed to [`Graph::run`].
#[derive(Clone, Default)]
pub struct Bindings {
    sources: HashMap<String, SourceFn>,
    sort_config: SortConfig,
}

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a stream factory. It is called once per source node per run.
    #[must_use]
    pub fn bind<F>(mut self, name: impl Into<String>, source: F) -> Self
    where
        F: Fn() -> RowStream + Send + Sync + 'static,
    {
        self.sources.insert(name.into(), Arc::new(source));
        self
    }

    /// Bind `name` to a fixed set of rows, replayed on every run.
    #[must_use]
    pub fn bind_rows(self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        let rows = Arc::new(rows);
        self.bind(name, move || stream::from_rows(rows.as_ref().clone()))
    }

    /// Default config for sort stages built without [`Graph::sort_with`].
    #[must_use]
    pub fn with_sort_config(mut self, config: SortConfig) -> Self {
        self.sort_config = config;
        self
    }

    #[must_use]
    pub fn sort_config(&self) -> &SortConfig {
        &self.sort_config
    }

    fn source(&self, name: &str) -> Result<RowStream> {
        self.sources
            .get(name)
            .map(|make| make())
            .ok_or_else(|| Error::UnboundSource(name.to_string()))
    }
}

impl Debug for Bindings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        let mut names: Vec<&String> = self.sources.keys().collect();
        names.sort();
        f.debug_struct("Bindings")
            .field("sources", &names)
            .field("sort_config", &self.sort_config)
            .finish()
    }
}

pub(crate) fn execute(graph: &Graph, bindings: &Bindings) -> Result<RowStream> {
    let id = graph.id();
    let node = graph.operation();
    tracing::debug!(node = %id, op = ?node, "building stage");

    let mut inputs = graph
        .parents()
        .iter()
        .map(|parent| execute(parent, bindings))
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let mut input = || {
        inputs
            .next()
            .ok_or_else(|| Error::InvalidConfiguration(format!("node {id} is missing an input")))
    };

    Ok(match node {
        Node::Source(Source::Named(name)) => bindings.source(name)?,
        Node::Source(Source::File { path, parser }) => io::read_lines(path.clone(), Arc::clone(parser)),
        Node::Map(mapper) => {
            let mapper = Arc::clone(mapper);
            flat_map_ok(input()?, move |row: Row| mapper.apply(row))
        }
        Node::Reduce { reducer, keys } => {
            let reducer = Arc::clone(reducer);
            let group_keys = Arc::clone(keys);
            flat_map_ok(Runs::new(input()?, Arc::clone(keys)), move |run: Run| {
                reducer.reduce(&group_keys, run.rows)
            })
        }
        Node::Sort { keys, config } => {
            let config = config.clone().unwrap_or_else(|| bindings.sort_config.clone());
            external_sort(input()?, Arc::clone(keys), config)
        }
        Node::Join { joiner, keys } => {
            let left = input()?;
            let right = input()?;
            merge_join(left, right, Arc::clone(keys), Arc::clone(joiner))
        }
    })
}
