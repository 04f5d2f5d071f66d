//! Structural mappers: pass-through, filtering, projection and renaming.

use crate::error::{Error, Result};
use crate::node::Mapper;
use crate::row::Row;
use crate::stream::{self, RowStream};
use std::fmt::{Debug, Formatter, Result as FormatResult};

/// Emits every row unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Mapper for Identity {
    fn apply(&self, row: Row) -> RowStream {
        stream::once(row)
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Keeps the rows for which the predicate returns `Ok(true)`.
///
/// A predicate error is forwarded and ends the run.
pub struct Filter<F> {
    predicate: F,
}

impl<F> Filter<F>
where
    F: Fn(&Row) -> Result<bool> + Send + Sync,
{
    #[must_use]
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> Debug for Filter<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str("Filter(..)")
    }
}

impl<F> Mapper for Filter<F>
where
    F: Fn(&Row) -> Result<bool> + Send + Sync,
{
    fn apply(&self, row: Row) -> RowStream {
        match (self.predicate)(&row) {
            Ok(true) => stream::once(row),
            Ok(false) => stream::empty(),
            Err(e) => stream::failed(e),
        }
    }

    fn name(&self) -> &'static str {
        "filter"
    }
}

/// Keeps only `columns`, in that order. A missing column is an error.
#[derive(Clone, Debug)]
pub struct Project {
    pub columns: Vec<String>,
}

impl Project {
    #[must_use]
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Mapper for Project {
    fn apply(&self, mut row: Row) -> RowStream {
        let projected = self
            .columns
            .iter()
            .map(|c| row.remove(c).map(|v| (c.clone(), v)).ok_or_else(|| Error::missing(c)))
            .collect::<Result<Row>>();
        stream::single(projected)
    }

    fn name(&self) -> &'static str {
        "project"
    }
}

/// Moves the value of `from` to a new column `to`, placed after all other columns.
#[derive(Clone, Debug)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

impl Rename {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Mapper for Rename {
    fn apply(&self, mut row: Row) -> RowStream {
        match row.remove(&self.from) {
            Some(value) => {
                row.insert(self.to.clone(), value);
                stream::once(row)
            }
            None => stream::failed(Error::missing(&self.from)),
        }
    }

    fn name(&self) -> &'static str {
        "rename"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_reorders_and_drops() {
        let row = Row::new().with("a", 1).with("b", 2).with("c", 3);
        let out: Vec<Row> = Project::new(["c", "a"]).apply(row).collect::<Result<_>>().unwrap();
        assert_eq!(out[0].columns().collect::<Vec<_>>(), vec!["c", "a"]);
    }

    #[test]
    fn rename_appends_the_new_column() {
        let row = Row::new().with("a", 1).with("b", 2);
        let out: Vec<Row> = Rename::new("a", "z").apply(row).collect::<Result<_>>().unwrap();
        assert_eq!(out[0].columns().collect::<Vec<_>>(), vec!["b", "z"]);
    }
}
