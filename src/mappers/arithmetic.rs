//! Arithmetic over numeric columns.

use crate::error::{Error, Result};
use crate::mappers::{column_pair, derive};
use crate::node::Mapper;
use crate::row::Row;
use crate::stream::RowStream;
use crate::value::Value;

/// Product of any number of numeric columns. Integers stay integers.
#[derive(Clone, Debug)]
pub struct Product {
    pub columns: Vec<String>,
    pub result: String,
}

impl Product {
    #[must_use]
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>, result: impl Into<String>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            result: result.into(),
        }
    }

    fn product(&self, row: &Row) -> Result<Value> {
        self.columns.iter().try_fold(Value::Int(1), |acc, column| {
            let v = row.require(column)?;
            acc.mul(v).ok_or_else(|| Error::TypeMismatch {
                column: column.clone(),
                expected: "number",
                found: v.kind(),
            })
        })
    }
}

impl Mapper for Product {
    fn apply(&self, row: Row) -> RowStream {
        derive(row, &self.result, |r| self.product(r))
    }

    fn name(&self) -> &'static str {
        "product"
    }
}

/// `columns[0] / columns[1]` as a float.
#[derive(Clone, Debug)]
pub struct Divide {
    pub columns: [String; 2],
    pub result: String,
}

impl Divide {
    pub fn new<S: AsRef<str>>(columns: &[S], result: impl Into<String>) -> Result<Self> {
        Ok(Self {
            columns: column_pair("divide", columns)?,
            result: result.into(),
        })
    }
}

impl Mapper for Divide {
    fn apply(&self, row: Row) -> RowStream {
        let [a, b] = &self.columns;
        derive(row, &self.result, |r| {
            Ok(Value::Float(r.require_f64(a)? / r.require_f64(b)?))
        })
    }

    fn name(&self) -> &'static str {
        "divide"
    }
}

/// Natural logarithm of `columns[0] / columns[1]`.
#[derive(Clone, Debug)]
pub struct FractionLog {
    pub columns: [String; 2],
    pub result: String,
}

impl FractionLog {
    pub fn new<S: AsRef<str>>(columns: &[S], result: impl Into<String>) -> Result<Self> {
        Ok(Self {
            columns: column_pair("fraction_log", columns)?,
            result: result.into(),
        })
    }
}

impl Mapper for FractionLog {
    fn apply(&self, row: Row) -> RowStream {
        let [a, b] = &self.columns;
        derive(row, &self.result, |r| {
            Ok(Value::Float((r.require_f64(a)? / r.require_f64(b)?).ln()))
        })
    }

    fn name(&self) -> &'static str {
        "fraction_log"
    }
}
