//! String-column mappers.

use crate::error::{Error, Result};
use crate::node::Mapper;
use crate::row::Row;
use crate::stream::{self, RowStream};
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

fn rewrite(mut row: Row, column: &str, f: impl FnOnce(&str) -> String) -> RowStream {
    match row.require_str(column).map(f) {
        Ok(text) => {
            row.insert(column, text);
            stream::once(row)
        }
        Err(e) => stream::failed(e),
    }
}

/// Lower-cases a string column in place.
#[derive(Clone, Debug)]
pub struct LowerCase {
    pub column: String,
}

impl LowerCase {
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Mapper for LowerCase {
    fn apply(&self, row: Row) -> RowStream {
        rewrite(row, &self.column, str::to_lowercase)
    }

    fn name(&self) -> &'static str {
        "lower_case"
    }
}

/// Strips ASCII punctuation from a string column.
#[derive(Clone, Debug)]
pub struct FilterPunctuation {
    pub column: String,
}

impl FilterPunctuation {
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Mapper for FilterPunctuation {
    fn apply(&self, row: Row) -> RowStream {
        rewrite(row, &self.column, |text| {
            text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
        })
    }

    fn name(&self) -> &'static str {
        "filter_punctuation"
    }
}

/// How [`Split`] cuts its column.
#[derive(Clone, Debug)]
enum Separator {
    Pattern(Regex),
    Chars,
}

/// Emits one copy of the row per piece of a string column, the column replaced by the
/// piece.
///
/// The separator is a regular expression (whitespace by default). An empty separator
/// splits into single characters. Leading or trailing separators produce empty pieces.
#[derive(Clone, Debug)]
pub struct Split {
    pub column: String,
    separator: Separator,
}

impl Split {
    /// Split on runs of whitespace.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            separator: Separator::Pattern(whitespace()),
        }
    }

    /// Split on `separator`, a regular expression. Invalid patterns are rejected.
    pub fn with_separator(column: impl Into<String>, separator: &str) -> Result<Self> {
        let separator = if separator.is_empty() {
            Separator::Chars
        } else {
            Separator::Pattern(Regex::new(separator).map_err(|e| {
                Error::InvalidConfiguration(format!("split separator `{separator}`: {e}"))
            })?)
        };
        Ok(Self {
            column: column.into(),
            separator,
        })
    }

    fn pieces(&self, text: &str) -> Vec<String> {
        match &self.separator {
            Separator::Pattern(re) => re.split(text).map(str::to_string).collect(),
            Separator::Chars => text.chars().map(String::from).collect(),
        }
    }
}

fn whitespace() -> Regex {
    static WHITESPACE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
    WHITESPACE.clone()
}

impl Mapper for Split {
    fn apply(&self, row: Row) -> RowStream {
        let pieces = match row.require_str(&self.column) {
            Ok(text) => self.pieces(text),
            Err(e) => return stream::failed(e),
        };
        let column = self.column.clone();
        Box::new(pieces.into_iter().map(move |piece| {
            let mut out = row.clone();
            out.insert(column.clone(), Value::Str(piece));
            Ok(out)
        }))
    }

    fn name(&self) -> &'static str {
        "split"
    }
}
