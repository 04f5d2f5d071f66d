//! # rowgraph
//!
//! A **lazy dataflow engine** for row-oriented batch computation: the single-machine
//! analogue of a MapReduce runtime. Build a directed acyclic graph of stages, then run it
//! against one or more row streams and pull rows out of the result.
//!
//! ## Key Features
//!
//! - **Lazy, pull-based execution** - no row is read until the output stream is pulled
//! - **Four stage kinds** - map, key-grouped reduce, key-grouped merge join, sort
//! - **Bounded-memory sort** - chunked in-memory sort, disk spill and k-way merge
//! - **Sort-merge join** - inner, left, right and outer semantics with collision renaming
//! - **Built-in library** - mappers, reducers and ready-made analytics [`pipelines`]
//! - **JSON-lines I/O** - optionally gzip or zstd compressed
//!
//! ## Quick Start
//!
//! ```
//! use rowgraph::{Bindings, Graph, row};
//! use rowgraph::reducers::Count;
//!
//! # fn main() -> rowgraph::Result<()> {
//! let graph = Graph::from_source("events")
//!     .sort(&["user"])
//!     .reduce(Count::new("events"), &["user"]);
//!
//! let bindings = Bindings::new().bind_rows(
//!     "events",
//!     vec![row! { "user" => "b" }, row! { "user" => "a" }, row! { "user" => "b" }],
//! );
//!
//! let rows = rowgraph::testing::collect_rows(graph.run(&bindings)?)?;
//! assert_eq!(rows, vec![
//!     row! { "user" => "a", "events" => 1 },
//!     row! { "user" => "b", "events" => 2 },
//! ]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Rows and values
//!
//! A [`Row`] is an insertion-ordered map from column name to [`Value`]. Stages take rows
//! by value, so no stage can observe another stage's changes.
//!
//! ### Graph
//!
//! A [`Graph`] is an immutable handle to one node. [`map`](Graph::map),
//! [`reduce`](Graph::reduce), [`sort`](Graph::sort) and [`join`](Graph::join) return new
//! nodes pointing at their parents; the same node may feed several children.
//!
//! ### Grouping contract
//!
//! Reduce and Join work on **runs**: maximal sequences of adjacent rows with equal key
//! values. They do not sort their input. Unsorted input silently yields several runs for
//! one key, so sort on the same keys first. [`Graph::explain`] flags grouped stages
//! whose input is not provably grouped.
//!
//! ### Errors
//!
//! Streams yield `Result<Row>`. The first error ends the stream; see [`Error`].
//!
//! ## Module Overview
//!
//! - [`graph`] - graph construction, [`Bindings`] and execution
//! - [`mappers`], [`reducers`], [`joins`] - the built-in operations
//! - [`config`] - external sort tuning
//! - [`io`] - file sources, JSON lines and compression
//! - [`pipelines`] - word count, inverted index, PMI, road speed
//! - [`testing`] - assertions and fixtures for tests

pub mod config;
pub mod error;
pub mod graph;
pub mod io;
pub mod joins;
pub mod mappers;
pub mod node;
pub mod node_id;
pub mod pipelines;
pub mod plan;
pub mod reducers;
pub mod row;
pub mod runner;
pub mod stream;
pub mod testing;
pub mod value;

mod sort;

pub use config::SortConfig;
pub use error::{Error, Result};
pub use graph::Graph;
pub use joins::{InnerJoiner, LeftJoiner, OuterJoiner, RightJoiner, Suffixes, cross_join};
pub use node::{FnMapper, Joiner, LineParser, Mapper, Node, Reducer, Source};
pub use node_id::NodeId;
pub use plan::Explanation;
pub use row::{KeyVector, Row};
pub use runner::{Bindings, SourceFn};
pub use stream::RowStream;
pub use value::Value;
