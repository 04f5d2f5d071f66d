//! Built-in mappers.
//!
//! | Mapper | Effect |
//! |---|---|
//! | [`Identity`] | passes rows through |
//! | [`Filter`] | keeps rows matching a predicate |
//! | [`Project`] | keeps only the named columns, in the given order |
//! | [`Rename`] | moves a column to a new name (appended last) |
//! | [`LowerCase`], [`FilterPunctuation`] | rewrite a string column |
//! | [`Split`] | one row per piece of a string column |
//! | [`Product`], [`Divide`], [`FractionLog`] | arithmetic into a result column |
//! | [`Strptime`], [`Strftime`], [`HoursBetween`] | timestamp parsing, formatting, differences |
//! | [`Haversine`] | great-circle distance between two `[lon, lat]` points |
//!
//! Mappers that take a pair of columns reject any other number of columns when they are
//! constructed.

pub mod arithmetic;
pub mod basic;
pub mod geo;
pub mod text;
pub mod time;

pub use arithmetic::{Divide, FractionLog, Product};
pub use basic::{Filter, Identity, Project, Rename};
pub use geo::Haversine;
pub use text::{FilterPunctuation, LowerCase, Split};
pub use time::{HoursBetween, Strftime, Strptime};

use crate::error::{Error, Result};
use crate::row::Row;
use crate::stream::{self, RowStream};
use crate::value::Value;

/// Compute a value from `row` and store it under `result`.
pub(crate) fn derive(
    mut row: Row,
    result: &str,
    f: impl FnOnce(&Row) -> Result<Value>,
) -> RowStream {
    match f(&row) {
        Ok(value) => {
            row.insert(result, value);
            stream::once(row)
        }
        Err(e) => stream::failed(e),
    }
}

/// Exactly two column names, or `InvalidConfiguration` naming the mapper.
pub(crate) fn column_pair<S: AsRef<str>>(mapper: &str, columns: &[S]) -> Result<[String; 2]> {
    match columns {
        [a, b] => Ok([a.as_ref().to_string(), b.as_ref().to_string()]),
        _ => Err(Error::InvalidConfiguration(format!(
            "{mapper} takes exactly two columns, got {}",
            columns.len()
        ))),
    }
}
