//! Built-in reducers.
//!
//! Every reducer receives one run of rows sharing the reduce keys and emits its result
//! rows for that run:
//!
//! - [`Count`] -- key columns + number of rows
//! - [`Sum`] -- key columns + sum of one numeric column
//! - [`TopN`] -- the `n` rows with the largest value in a column, rows unchanged
//! - [`TermFrequency`] -- key columns + each distinct word's share of the run
//! - [`FirstReducer`] -- the first row of the run
//!
//! Custom reducers implement [`Reducer`](crate::Reducer).

pub mod basic;
pub mod frequency;
pub mod topn;

pub use basic::{Count, FirstReducer, Sum};
pub use frequency::TermFrequency;
pub use topn::TopN;

use crate::error::Result;
use crate::row::Row;

/// A new row holding only the key columns of `row`.
pub(crate) fn key_columns(keys: &[String], row: &Row) -> Result<Row> {
    let mut out = Row::with_capacity(keys.len() + 1);
    for k in keys {
        out.insert(k.clone(), row.require(k)?.clone());
    }
    Ok(out)
}
