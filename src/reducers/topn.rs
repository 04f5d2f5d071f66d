//! Top-N rows by a column.

use crate::error::Result;
use crate::node::Reducer;
use crate::row::Row;
use crate::stream::{self, RowStream};
use crate::value::Value;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// The `n` rows of each run with the largest value in `column`.
///
/// The accumulator is a **min-heap** of size ≤ `n`, so memory is bounded by `n` on top of
/// the run itself. Among equal values the row seen first wins, and rows come out
/// largest-first, equal values in encounter order. Rows are emitted unchanged.
///
/// `n == 0` emits nothing.
#[derive(Clone, Debug)]
pub struct TopN {
    pub column: String,
    pub n: usize,
}

impl TopN {
    #[must_use]
    pub fn new(column: impl Into<String>, n: usize) -> Self {
        Self {
            column: column.into(),
            n,
        }
    }

    fn select(&self, group: Vec<Row>) -> Result<Vec<Row>> {
        let bound = group.len().min(self.n).saturating_add(1);
        let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(bound);
        for (seq, row) in group.into_iter().enumerate() {
            let value = row.require(&self.column)?.clone();
            heap.push(Reverse(Ranked { value, seq, row }));
            if heap.len() > self.n {
                heap.pop(); // drop the smallest, or the latest among equals
            }
        }
        // Ascending `Reverse` order is descending rank.
        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(r)| r.row)
            .collect())
    }
}

/// A row ranked by its value; among equal values an earlier row ranks higher.
struct Ranked {
    value: Value,
    seq: usize,
    row: Row,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl Reducer for TopN {
    fn reduce(&self, _keys: &[String], group: Vec<Row>) -> RowStream {
        match self.select(group) {
            Ok(rows) => stream::from_rows(rows),
            Err(e) => stream::failed(e),
        }
    }

    fn name(&self) -> &'static str {
        "top_n"
    }
}
