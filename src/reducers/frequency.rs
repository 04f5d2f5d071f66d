//! Term frequency within a run.

use crate::error::Result;
use crate::node::Reducer;
use crate::reducers::key_columns;
use crate::row::Row;
use crate::stream::{self, RowStream};
use crate::value::Value;
use std::collections::BTreeMap;

/// For each distinct value of `words_column` in a run: the key columns, the word, and the
/// word's share of the run (`occurrences / rows`), written to `result_column`.
///
/// Words are emitted in order of first appearance.
#[derive(Clone, Debug)]
pub struct TermFrequency {
    pub words_column: String,
    pub result_column: String,
}

impl TermFrequency {
    /// Frequencies written to the `tf` column.
    #[must_use]
    pub fn new(words_column: impl Into<String>) -> Self {
        Self::with_result(words_column, "tf")
    }

    #[must_use]
    pub fn with_result(words_column: impl Into<String>, result_column: impl Into<String>) -> Self {
        Self {
            words_column: words_column.into(),
            result_column: result_column.into(),
        }
    }

    fn frequencies(&self, keys: &[String], group: &[Row]) -> Result<Vec<Row>> {
        let Some(first) = group.first() else {
            return Ok(Vec::new());
        };
        let base = key_columns(keys, first)?;

        let mut index: BTreeMap<&Value, usize> = BTreeMap::new();
        let mut counts: Vec<(&Value, usize)> = Vec::new();
        for row in group {
            let word = row.require(&self.words_column)?;
            match index.get(word) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(word, counts.len());
                    counts.push((word, 1));
                }
            }
        }

        let total = group.len() as f64;
        Ok(counts
            .into_iter()
            .map(|(word, n)| {
                base.clone()
                    .with(self.words_column.clone(), word.clone())
                    .with(self.result_column.clone(), n as f64 / total)
            })
            .collect())
    }
}

impl Reducer for TermFrequency {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> RowStream {
        match self.frequencies(keys, &group) {
            Ok(rows) => stream::from_rows(rows),
            Err(e) => stream::failed(e),
        }
    }

    fn name(&self) -> &'static str {
        "term_frequency"
    }
}
