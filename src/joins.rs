//! Sort-merge join over two key-grouped streams, and the four join semantics.
//!
//! [`merge_join`] walks the runs of both inputs in key order:
//!
//! - the side whose current run-key is strictly smaller is handed to the joiner alone,
//!   paired with an empty run for the other side;
//! - an exhausted side counts as an infinitely large key, so the other side drains through
//!   that same path;
//! - equal run-keys are handed to the joiner together and both sides advance.
//!
//! Only the current run of each side (plus one row of lookahead each) is held in memory.
//! With an empty key vector each side is a single run, so the join becomes a full cross
//! join of the two inputs.
//!
//! Inputs must be key-contiguous and ordered the same way on both sides (e.g. both sorted
//! by the join keys). The engine does not check this.

use crate::error::Result;
use crate::node::Joiner;
use crate::row::Row;
use crate::stream::{self, Run, RowStream, Runs, flat_map_ok};
use std::cmp::Ordering;
use std::sync::Arc;

/// Suffixes for non-key columns present on both sides of a cross join.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suffixes {
    pub left: String,
    pub right: String,
}

impl Default for Suffixes {
    fn default() -> Self {
        Self {
            left: "_1".to_string(),
            right: "_2".to_string(),
        }
    }
}

impl Suffixes {
    #[must_use]
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Merge two grouped streams and feed each aligned pair of runs to `joiner`.
pub(crate) fn merge_join(
    left: RowStream,
    right: RowStream,
    keys: Arc<[String]>,
    joiner: Arc<dyn Joiner>,
) -> RowStream {
    let pairs = MergeRuns {
        left: Side::new(Runs::new(left, Arc::clone(&keys))),
        right: Side::new(Runs::new(right, Arc::clone(&keys))),
        failed: false,
    };
    flat_map_ok(pairs, move |(l, r)| joiner.join(&keys, l, r))
}

struct Side {
    runs: Runs,
    head: Option<Run>,
    // The head was consumed and the next run has not been pulled yet.
    stale: bool,
}

impl Side {
    fn new(runs: Runs) -> Self {
        Self {
            runs,
            head: None,
            stale: true,
        }
    }

    fn refresh(&mut self) -> Result<()> {
        if self.stale {
            self.head = self.runs.next().transpose()?;
            self.stale = false;
        }
        Ok(())
    }

    fn take(&mut self) -> Vec<Row> {
        self.stale = true;
        self.head.take().map(|run| run.rows).unwrap_or_default()
    }
}

struct MergeRuns {
    left: Side,
    right: Side,
    failed: bool,
}

impl MergeRuns {
    fn step(&mut self) -> Result<Option<(Vec<Row>, Vec<Row>)>> {
        self.left.refresh()?;
        self.right.refresh()?;
        let order = match (&self.left.head, &self.right.head) {
            (None, None) => return Ok(None),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(l), Some(r)) => l.key.cmp(&r.key),
        };
        Ok(Some(match order {
            Ordering::Less => (self.left.take(), Vec::new()),
            Ordering::Greater => (Vec::new(), self.right.take()),
            Ordering::Equal => (self.left.take(), self.right.take()),
        }))
    }
}

impl Iterator for MergeRuns {
    type Item = Result<(Vec<Row>, Vec<Row>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let step = self.step();
        if step.is_err() {
            self.failed = true;
        }
        step.transpose()
    }
}

/// Pair every left row with every right row.
///
/// Key columns are copied once (from the left row). Columns found in only one row are
/// copied as they are. Non-key columns found in both get the left and right suffixes.
/// The output is produced lazily, one pair at a time.
pub fn cross_join(keys: &[String], left: Vec<Row>, right: Vec<Row>, suffixes: &Suffixes) -> RowStream {
    let keys: Arc<[String]> = Arc::from(keys);
    let right = Arc::new(right);
    let suffixes = suffixes.clone();
    Box::new(left.into_iter().flat_map(move |l| {
        let keys = Arc::clone(&keys);
        let suffixes = suffixes.clone();
        let right = Arc::clone(&right);
        (0..right.len()).map(move |i| merge_pair(&keys, &l, &right[i], &suffixes))
    }))
}

fn merge_pair(keys: &[String], left: &Row, right: &Row, suffixes: &Suffixes) -> Result<Row> {
    let is_key = |c: &str| keys.iter().any(|k| k == c);
    let mut out = Row::with_capacity(left.len() + right.len());
    for k in keys {
        out.insert(k.clone(), left.require(k)?.clone());
    }
    for (column, value) in left {
        if is_key(column.as_str()) {
            continue;
        }
        match right.get(column) {
            Some(other) => {
                out.insert(format!("{column}{}", suffixes.left), value.clone());
                out.insert(format!("{column}{}", suffixes.right), other.clone());
            }
            None => {
                out.insert(column.clone(), value.clone());
            }
        }
    }
    for (column, value) in right {
        if !is_key(column.as_str()) && !left.contains(column) {
            out.insert(column.clone(), value.clone());
        }
    }
    Ok(out)
}

/// Emits the cross join only for keys present on both sides.
#[derive(Clone, Debug, Default)]
pub struct InnerJoiner {
    pub suffixes: Suffixes,
}

/// Keeps unmatched left rows unchanged (no suffixes, no padding).
#[derive(Clone, Debug, Default)]
pub struct LeftJoiner {
    pub suffixes: Suffixes,
}

/// Keeps unmatched right rows unchanged (no suffixes, no padding).
#[derive(Clone, Debug, Default)]
pub struct RightJoiner {
    pub suffixes: Suffixes,
}

/// Keeps unmatched rows from both sides unchanged.
#[derive(Clone, Debug, Default)]
pub struct OuterJoiner {
    pub suffixes: Suffixes,
}

impl Joiner for InnerJoiner {
    fn join(&self, keys: &[String], left: Vec<Row>, right: Vec<Row>) -> RowStream {
        if left.is_empty() || right.is_empty() {
            return stream::empty();
        }
        cross_join(keys, left, right, &self.suffixes)
    }

    fn name(&self) -> &'static str {
        "inner"
    }
}

impl Joiner for LeftJoiner {
    fn join(&self, keys: &[String], left: Vec<Row>, right: Vec<Row>) -> RowStream {
        if right.is_empty() {
            return stream::from_rows(left);
        }
        cross_join(keys, left, right, &self.suffixes)
    }

    fn name(&self) -> &'static str {
        "left"
    }
}

impl Joiner for RightJoiner {
    fn join(&self, keys: &[String], left: Vec<Row>, right: Vec<Row>) -> RowStream {
        if left.is_empty() {
            return stream::from_rows(right);
        }
        cross_join(keys, left, right, &self.suffixes)
    }

    fn name(&self) -> &'static str {
        "right"
    }
}

impl Joiner for OuterJoiner {
    fn join(&self, keys: &[String], left: Vec<Row>, right: Vec<Row>) -> RowStream {
        if left.is_empty() {
            return stream::from_rows(right);
        }
        if right.is_empty() {
            return stream::from_rows(left);
        }
        cross_join(keys, left, right, &self.suffixes)
    }

    fn name(&self) -> &'static str {
        "outer"
    }
}

// Constructors shared by all four joiners.
macro_rules! impl_joiner_ctors {
    ($($name:ident),+) => {$(
        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Use custom suffixes for colliding non-key columns.
            #[must_use]
            pub fn with_suffixes(left: impl Into<String>, right: impl Into<String>) -> Self {
                Self {
                    suffixes: Suffixes::new(left, right),
                }
            }
        }
    )+};
}

impl_joiner_ctors!(InnerJoiner, LeftJoiner, RightJoiner, OuterJoiner);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_pair_orders_keys_then_left_then_right() {
        let keys = vec!["id".to_string()];
        let l = Row::new().with("x", 1).with("id", 7).with("a", "l");
        let r = Row::new().with("id", 7).with("b", "r").with("x", 2);
        let out = merge_pair(&keys, &l, &r, &Suffixes::default()).unwrap();
        assert_eq!(out.columns().collect::<Vec<_>>(), vec!["id", "x_1", "x_2", "a", "b"]);
    }

    #[test]
    fn cross_join_is_lazy_and_complete() {
        let left = (0..3).map(|i| Row::new().with("l", i)).collect();
        let right = (0..4).map(|i| Row::new().with("r", i)).collect();
        let mut out = cross_join(&[], left, right, &Suffixes::default());
        let first = out.next().unwrap().unwrap();
        assert_eq!(first, Row::new().with("l", 0).with("r", 0));
        assert_eq!(out.count(), 11);
    }
}
