//! Timestamp parsing, formatting and differences.
//!
//! Format strings use `chrono` syntax. `%.f` matches an optional fractional second, so
//! `"%Y%m%dT%H%M%S%.f"` accepts both `20171020T112238.723000` and `20171020T112238`.
//! Unknown specifiers are rejected when the mapper is built.

use crate::error::{Error, Result};
use crate::mappers::{column_pair, derive};
use crate::node::Mapper;
use crate::row::Row;
use crate::stream::RowStream;
use crate::value::Value;
use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write as _;

fn checked_format(mapper: &str, format: String) -> Result<String> {
    if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::InvalidConfiguration(format!(
            "{mapper}: invalid time format `{format}`"
        )));
    }
    Ok(format)
}

/// Parses a string column into a timestamp stored under `result`.
#[derive(Clone, Debug)]
pub struct Strptime {
    pub column: String,
    pub format: String,
    pub result: String,
}

impl Strptime {
    pub fn new(
        column: impl Into<String>,
        format: impl Into<String>,
        result: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            column: column.into(),
            format: checked_format("strptime", format.into())?,
            result: result.into(),
        })
    }
}

impl Mapper for Strptime {
    fn apply(&self, row: Row) -> RowStream {
        derive(row, &self.result, |r| {
            let text = r.require_str(&self.column)?;
            NaiveDateTime::parse_from_str(text, &self.format)
                .map(Value::Timestamp)
                .map_err(|e| {
                    Error::invalid_value(&self.column, format!("`{text}` does not match `{}`: {e}", self.format))
                })
        })
    }

    fn name(&self) -> &'static str {
        "strptime"
    }
}

/// Formats a timestamp column into `result`.
///
/// With [`numeric`](Self::numeric) the formatted text is stored as an integer instead,
/// e.g. `%H` becomes the hour `0..=23`.
#[derive(Clone, Debug)]
pub struct Strftime {
    pub column: String,
    pub format: String,
    pub result: String,
    pub numeric: bool,
}

impl Strftime {
    pub fn new(
        column: impl Into<String>,
        format: impl Into<String>,
        result: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            column: column.into(),
            format: checked_format("strftime", format.into())?,
            result: result.into(),
            numeric: false,
        })
    }

    /// Store the formatted text as an integer.
    #[must_use]
    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    fn render(&self, row: &Row) -> Result<Value> {
        let ts = row.require_timestamp(&self.column)?;
        let mut text = String::new();
        // Offset specifiers such as `%z` cannot render a naive timestamp.
        write!(text, "{}", ts.format(&self.format)).map_err(|_| {
            Error::invalid_value(&self.column, format!("`{}` cannot render `{ts}`", self.format))
        })?;
        if !self.numeric {
            return Ok(Value::Str(text));
        }
        text.parse::<i64>().map(Value::Int).map_err(|_| {
            Error::invalid_value(&self.column, format!("`{}` rendered `{text}`, not an integer", self.format))
        })
    }
}

impl Mapper for Strftime {
    fn apply(&self, row: Row) -> RowStream {
        derive(row, &self.result, |r| self.render(r))
    }

    fn name(&self) -> &'static str {
        "strftime"
    }
}

/// Hours elapsed from `columns[0]` to `columns[1]`, as a float.
#[derive(Clone, Debug)]
pub struct HoursBetween {
    pub columns: [String; 2],
    pub result: String,
}

impl HoursBetween {
    pub fn new<S: AsRef<str>>(columns: &[S], result: impl Into<String>) -> Result<Self> {
        Ok(Self {
            columns: column_pair("hours_between", columns)?,
            result: result.into(),
        })
    }
}

impl Mapper for HoursBetween {
    fn apply(&self, row: Row) -> RowStream {
        let [start, end] = &self.columns;
        derive(row, &self.result, |r| {
            let delta = r.require_timestamp(end)? - r.require_timestamp(start)?;
            let hours = match delta.num_microseconds() {
                Some(us) => us as f64 / 3_600_000_000.0,
                None => delta.num_seconds() as f64 / 3_600.0,
            };
            Ok(Value::Float(hours))
        })
    }

    fn name(&self) -> &'static str {
        "hours_between"
    }
}
