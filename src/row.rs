//! The row type and key-vector extraction.

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter};
use serde::{Deserialize, Serialize};

/// Composite key read off a row: one value per key column, in key order.
pub type KeyVector = Vec<Value>;

/// An insertion-ordered mapping from column name to [`Value`].
///
/// Rows are plain values: stages receive them by value and hand back new (or modified)
/// rows, so no stage ever observes another stage's mutation.
///
/// Equality ignores column order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row(IndexMap<String, Value>);

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(n: usize) -> Self {
        Self(IndexMap::with_capacity(n))
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert or overwrite a column. Overwriting keeps the column's position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(column.into(), value.into())
    }

    /// Remove a column, keeping the order of the remaining ones.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.0.shift_remove(column)
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Like [`get`](Self::get) but a missing column is an error.
    pub fn require(&self, column: &str) -> Result<&Value> {
        self.0.get(column).ok_or_else(|| Error::missing(column))
    }

    pub fn require_str(&self, column: &str) -> Result<&str> {
        let v = self.require(column)?;
        v.as_str().ok_or_else(|| mismatch(column, "string", v))
    }

    /// Numeric column (`Int` or `Float`) as `f64`.
    pub fn require_f64(&self, column: &str) -> Result<f64> {
        let v = self.require(column)?;
        v.as_f64().ok_or_else(|| mismatch(column, "number", v))
    }

    pub fn require_timestamp(&self, column: &str) -> Result<NaiveDateTime> {
        let v = self.require(column)?;
        v.as_timestamp().ok_or_else(|| mismatch(column, "timestamp", v))
    }

    pub fn require_list(&self, column: &str) -> Result<&[f64]> {
        let v = self.require(column)?;
        v.as_list().ok_or_else(|| mismatch(column, "list", v))
    }

    /// Read the key vector for `keys`. Any missing key column is an error.
    pub fn key(&self, keys: &[String]) -> Result<KeyVector> {
        keys.iter().map(|k| self.require(k).cloned()).collect()
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a JSON object, preserving column order.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Build a row from a decoded JSON object.
    pub fn from_json(json: serde_json::Value) -> std::result::Result<Row, String> {
        let serde_json::Value::Object(map) = json else {
            return Err(format!("expected a JSON object, found {json}"));
        };
        map.into_iter()
            .map(|(k, v)| Value::from_json(v).map(|v| (k, v)))
            .collect()
    }
}

fn mismatch(column: &str, expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        column: column.to_string(),
        expected,
        found: found.kind(),
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
