//! Counting, summing and picking a representative row.

use crate::error::{Error, Result};
use crate::node::Reducer;
use crate::reducers::key_columns;
use crate::row::Row;
use crate::stream::{self, RowStream};
use crate::value::Value;

/// Number of rows per run.
///
/// ```text
/// keys = [a], column = "n"
///   {a: 1, b: 5}
///   {a: 1, b: 6}    =>   {a: 1, n: 2}
/// ```
#[derive(Clone, Debug)]
pub struct Count {
    /// Column the count is written to.
    pub column: String,
}

impl Count {
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Reducer for Count {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> RowStream {
        let Some(first) = group.first() else {
            return stream::empty();
        };
        stream::single(key_columns(keys, first).map(|row| row.with(self.column.clone(), group.len())))
    }

    fn name(&self) -> &'static str {
        "count"
    }
}

/// Sum of a numeric column per run, written back under the same column name.
///
/// Integer columns stay integers; any float in the run makes the sum a float.
///
/// ```text
/// keys = [a], column = "b"
///   {a: 1, b: 2, c: 4}
///   {a: 1, b: 3, c: 5}    =>   {a: 1, b: 5}
/// ```
#[derive(Clone, Debug)]
pub struct Sum {
    pub column: String,
}

impl Sum {
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    fn total(&self, group: &[Row]) -> Result<Value> {
        group.iter().try_fold(Value::Int(0), |acc, row| {
            let v = row.require(&self.column)?;
            acc.add(v).ok_or_else(|| Error::TypeMismatch {
                column: self.column.clone(),
                expected: "number",
                found: v.kind(),
            })
        })
    }
}

impl Reducer for Sum {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> RowStream {
        let Some(first) = group.first() else {
            return stream::empty();
        };
        let row = key_columns(keys, first)
            .and_then(|row| Ok(row.with(self.column.clone(), self.total(&group)?)));
        stream::single(row)
    }

    fn name(&self) -> &'static str {
        "sum"
    }
}

/// Emits the first row of each run unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstReducer;

impl Reducer for FirstReducer {
    fn reduce(&self, _keys: &[String], group: Vec<Row>) -> RowStream {
        match group.into_iter().next() {
            Some(row) => stream::once(row),
            None => stream::empty(),
        }
    }

    fn name(&self) -> &'static str {
        "first"
    }
}
