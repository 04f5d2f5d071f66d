//! Error type shared by every stage of the engine.
//!
//! Errors travel *in-band*: streams yield `Result<Row>` items, and every stage stops
//! producing rows after forwarding the first error it observes. Nothing is retried; the
//! caller sees the first failure and the run is abandoned.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building or running a graph.
#[derive(Error, Debug)]
pub enum Error {
    /// A row lacks a column an operation requires.
    #[error("missing column `{column}`")]
    MissingColumn { column: String },

    /// A column holds a value of the wrong kind for the operation reading it.
    #[error("column `{column}`: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A source line could not be turned into a row.
    #[error("malformed input in {origin} at line {line}: {message}")]
    MalformedInput {
        origin: String,
        line: usize,
        message: String,
    },

    /// A column holds a value of the right kind that still cannot be used, such as a
    /// string that does not match a timestamp format.
    #[error("column `{column}`: {message}")]
    InvalidValue { column: String, message: String },

    /// An operation was constructed with arguments it cannot work with.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `run` was asked to execute a named source that has no binding.
    #[error("no binding supplied for source `{0}`")]
    UnboundSource(String),

    /// A file source could not be opened or read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external sort could not write or read its spill storage.
    #[error("spill storage error: {0}")]
    Spill(#[from] std::io::Error),

    /// A spilled row could not be encoded or decoded.
    #[error("spill codec error: {0}")]
    SpillCodec(#[from] postcard::Error),
}

impl Error {
    pub(crate) fn missing(column: &str) -> Self {
        Error::MissingColumn {
            column: column.to_string(),
        }
    }

    pub(crate) fn invalid_value(column: &str, message: impl ToString) -> Self {
        Error::InvalidValue {
            column: column.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn malformed(origin: impl Into<String>, line: usize, message: impl ToString) -> Self {
        Error::MalformedInput {
            origin: origin.into(),
            line,
            message: message.to_string(),
        }
    }
}
