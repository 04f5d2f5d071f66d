//! Column values and their total order.
//!
//! Grouping and sorting both compare key vectors lexicographically, so [`Value`] carries a
//! total order:
//!
//! - `Int` and `Float` are one numeric family and compare by exact numeric value, with no
//!   rounding of large integers through `f64`; floats use the IEEE total order via
//!   [`OrderedFloat`] (so `NaN` sorts above every number).
//! - every other variant compares within itself (`List` element-wise).
//! - values from different families order by a fixed rank:
//!   `Null < Bool < number < Str < Timestamp < List`.
//!
//! Equality follows the same order, so `Int(2) == Float(2.0)`.

use chrono::NaiveDateTime;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FormatResult};

/// Format used when a timestamp is rendered as text (JSON output, `Display`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single cell of a [`Row`](crate::Row).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Timestamp(NaiveDateTime),
    /// A small ordered list of numbers, e.g. a `[lon, lat]` coordinate.
    List(Vec<f64>),
}

impl Value {
    /// Human-readable name of the variant, used in type errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Str(_) => 3,
            Value::Timestamp(_) => 4,
            Value::List(_) => 5,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of `Int` and `Float` values.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[f64]> {
        match self {
            Value::List(xs) => Some(xs),
            _ => None,
        }
    }

    /// Numeric addition. `Int + Int` stays integral unless it overflows.
    #[must_use]
    pub fn add(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(
                a.checked_add(*b)
                    .map_or(Value::Float(*a as f64 + *b as f64), Value::Int),
            ),
            _ => Some(Value::Float(self.as_f64()? + other.as_f64()?)),
        }
    }

    /// Numeric multiplication. `Int * Int` stays integral unless it overflows.
    #[must_use]
    pub fn mul(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(
                a.checked_mul(*b)
                    .map_or(Value::Float(*a as f64 * *b as f64), Value::Int),
            ),
            _ => Some(Value::Float(self.as_f64()? * other.as_f64()?)),
        }
    }

    /// Convert a decoded JSON value.
    ///
    /// Objects, non-numeric arrays and integers beyond the `i64` range are rejected, so
    /// distinct large ids are never collapsed into one float.
    pub fn from_json(json: serde_json::Value) -> Result<Value, String> {
        use serde_json::Value as Json;
        Ok(match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::Int(i),
                (None, Some(_)) => return Err(format!("integer {n} does not fit in 64 signed bits")),
                (None, None) => {
                    Value::Float(n.as_f64().ok_or_else(|| format!("unsupported number {n}"))?)
                }
            },
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::List(
                items
                    .iter()
                    .map(|x| x.as_f64().ok_or_else(|| format!("non-numeric list element {x}")))
                    .collect::<Result<_, _>>()?,
            ),
            Json::Object(_) => return Err("nested objects are not supported".to_string()),
        })
    }

    /// Render as JSON. Non-finite floats become `null`; timestamps become strings.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{Number, Value as Json};
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::Str(s) => Json::String(s.clone()),
            Value::Timestamp(t) => Json::String(t.format(TIMESTAMP_FORMAT).to_string()),
            Value::List(xs) => Json::Array(
                xs.iter()
                    .map(|x| Number::from_f64(*x).map_or(Json::Null, Json::Number))
                    .collect(),
            ),
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => OrderedFloat(*a).cmp(&OrderedFloat(*b)),
            (Value::Int(a), Value::Float(b)) => cmp_int_float(*a, *b),
            (Value::Float(a), Value::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => a
                .iter()
                .copied()
                .map(OrderedFloat)
                .cmp(b.iter().copied().map(OrderedFloat)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Exact comparison of an integer with a float, `NaN` above every number.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63, exactly representable; every integral float in [-2^63, 2^63) fits an i64.
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= BOUND {
        return Ordering::Less;
    }
    if f < -BOUND {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    i.cmp(&(whole as i64)).then_with(|| {
        if f > whole {
            Ordering::Less
        } else if f < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

impl PartialOrd for Value {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Timestamp(t) => write!(f, "{}", t.format(TIMESTAMP_FORMAT)),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or(Value::Float(v as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::List(v)
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(v: [f64; N]) -> Self {
        Value::List(v.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_compare_across_int_and_float() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert!(Value::Int(2) < Value::Float(2.5));
        assert!(Value::Float(-1.0) < Value::Int(0));
    }

    #[test]
    fn int_float_comparison_is_exact_beyond_f64_precision() {
        let big = 1_i64 << 53;
        let f = Value::Float(big as f64);
        assert_eq!(Value::Int(big), f);
        assert!(f < Value::Int(big + 1));
        assert!(Value::Int(big) < Value::Int(big + 1));
        assert!(Value::Int(i64::MAX) < Value::Float(9_223_372_036_854_775_808.0));
        assert!(Value::Int(i64::MIN) == Value::Float(-9_223_372_036_854_775_808.0));
        assert!(Value::Int(-1) < Value::Float(-0.5));
        assert!(Value::Int(0) > Value::Float(-0.5));
        assert_eq!(Value::Int(0), Value::Float(-0.0));
        assert!(Value::Int(i64::MAX) < Value::Float(f64::NAN));
        assert!(Value::Float(f64::NEG_INFINITY) < Value::Int(i64::MIN));
    }

    #[test]
    fn families_order_by_rank() {
        assert!(Value::Null < Value::Bool(false));
        assert!(Value::Int(i64::MAX) < Value::Str(String::new()));
        assert!(Value::Str("zzz".into()) < Value::List(vec![]));
    }

    #[test]
    fn nan_sorts_above_numbers() {
        assert!(Value::Float(f64::NAN) > Value::Float(f64::INFINITY));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert!(matches!(Value::Int(2).add(&Value::Int(3)), Some(Value::Int(5))));
        assert!(matches!(Value::Int(2).mul(&Value::Float(1.5)), Some(Value::Float(f)) if f == 3.0));
        assert!(matches!(Value::Int(i64::MAX).add(&Value::Int(1)), Some(Value::Float(_))));
        assert!(Value::Str("x".into()).add(&Value::Int(1)).is_none());
    }

    #[test]
    fn json_conversion() {
        let v = Value::from_json(serde_json::json!([37.5, 55])).unwrap();
        assert_eq!(v, Value::List(vec![37.5, 55.0]));
        assert!(Value::from_json(serde_json::json!({"a": 1})).is_err());
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
        assert_eq!(Value::from_json(serde_json::json!(3)).unwrap().kind(), "int");
        assert_eq!(Value::from_json(serde_json::json!(i64::MAX)).unwrap(), Value::Int(i64::MAX));
        assert!(Value::from_json(serde_json::json!(u64::MAX)).is_err());
    }
}
