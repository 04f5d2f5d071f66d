//! Lazy row streams and the run-grouping adapter shared by Reduce and Join.
//!
//! A [`RowStream`] is a boxed iterator of `Result<Row>`. Streams are pull-based: nothing
//! upstream is evaluated until the consumer asks for the next row. Every adapter in this
//! module forwards the first error it sees and then ends.

use crate::error::{Error, Result};
use crate::row::{KeyVector, Row};
use std::sync::Arc;

/// A lazy, single-pass stream of rows.
pub type RowStream = Box<dyn Iterator<Item = Result<Row>>>;

/// Stream over already-materialized rows.
#[must_use]
pub fn from_rows(rows: Vec<Row>) -> RowStream {
    Box::new(rows.into_iter().map(Ok))
}

/// Stream of exactly one row.
#[must_use]
pub fn once(row: Row) -> RowStream {
    Box::new(std::iter::once(Ok(row)))
}

#[must_use]
pub fn empty() -> RowStream {
    Box::new(std::iter::empty())
}

/// Stream that yields `err` and ends.
#[must_use]
pub fn failed(err: Error) -> RowStream {
    Box::new(std::iter::once(Err(err)))
}

/// Lift a fallible single-row computation into a stream.
#[must_use]
pub fn single(row: Result<Row>) -> RowStream {
    Box::new(std::iter::once(row))
}

/// Expand every `Ok` item of `source` into a sub-stream and concatenate them in order.
///
/// Stops after forwarding the first error from either `source` or a sub-stream.
pub(crate) fn flat_map_ok<I, T, F>(source: I, f: F) -> RowStream
where
    I: Iterator<Item = Result<T>> + 'static,
    T: 'static,
    F: FnMut(T) -> RowStream + 'static,
{
    Box::new(FlatMapOk {
        source,
        f,
        current: None,
        failed: false,
    })
}

struct FlatMapOk<I, F> {
    source: I,
    f: F,
    current: Option<RowStream>,
    failed: bool,
}

impl<I, T, F> Iterator for FlatMapOk<I, F>
where
    I: Iterator<Item = Result<T>>,
    F: FnMut(T) -> RowStream,
{
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(cur) = self.current.as_mut() {
                match cur.next() {
                    Some(Ok(row)) => return Some(Ok(row)),
                    Some(Err(e)) => {
                        self.failed = true;
                        self.current = None;
                        return Some(Err(e));
                    }
                    None => self.current = None,
                }
            }
            match self.source.next()? {
                Ok(item) => self.current = Some((self.f)(item)),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// A maximal run of adjacent rows sharing one key vector.
#[derive(Debug)]
pub(crate) struct Run {
    pub key: KeyVector,
    pub rows: Vec<Row>,
}

/// Splits a stream into [`Run`]s by adjacent key equality.
///
/// Holds exactly one row of lookahead: the first row of the next run, read while
/// discovering the end of the current one. Equal keys that are not adjacent start a new
/// run; no global grouping happens here.
pub(crate) struct Runs {
    input: RowStream,
    keys: Arc<[String]>,
    lookahead: Option<(KeyVector, Row)>,
    done: bool,
}

impl Runs {
    pub(crate) fn new(input: RowStream, keys: Arc<[String]>) -> Self {
        Self {
            input,
            keys,
            lookahead: None,
            done: false,
        }
    }

    fn pull(&mut self) -> Option<Result<(KeyVector, Row)>> {
        let row = match self.input.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e)),
        };
        Some(row.key(&self.keys).map(|k| (k, row)))
    }

    fn fail(&mut self, err: Error) -> Option<Result<Run>> {
        self.done = true;
        self.lookahead = None;
        Some(Err(err))
    }
}

impl Iterator for Runs {
    type Item = Result<Run>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (key, first) = match self.lookahead.take() {
            Some(head) => head,
            None => match self.pull() {
                Some(Ok(head)) => head,
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.done = true;
                    return None;
                }
            },
        };

        let mut rows = vec![first];
        loop {
            match self.pull() {
                Some(Ok((k, row))) if k == key => rows.push(row),
                Some(Ok(next_head)) => {
                    self.lookahead = Some(next_head);
                    break;
                }
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.done = true;
                    break;
                }
            }
        }
        Some(Ok(Run { key, rows }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(values: &[&str]) -> RowStream {
        from_rows(values.iter().map(|v| Row::new().with("k", *v)).collect())
    }

    #[test]
    fn runs_split_on_adjacent_key_changes() {
        let runs: Vec<Run> = Runs::new(keyed(&["a", "a", "b", "a"]), Arc::from(vec!["k".to_string()]))
            .collect::<Result<_>>()
            .unwrap();
        let sizes: Vec<usize> = runs.iter().map(|r| r.rows.len()).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
    }

    #[test]
    fn empty_key_is_one_run() {
        let runs: Vec<Run> = Runs::new(keyed(&["a", "b", "c"]), Arc::from(Vec::<String>::new()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].rows.len(), 3);
    }

    #[test]
    fn errors_end_the_stream() {
        let input: RowStream = Box::new(
            vec![Ok(Row::new().with("k", 1)), Ok(Row::new().with("other", 1)), Ok(Row::new().with("k", 1))]
                .into_iter(),
        );
        let items: Vec<_> = Runs::new(input, Arc::from(vec!["k".to_string()])).collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(Error::MissingColumn { .. })));
    }

    #[test]
    fn flat_map_ok_stops_after_first_error() {
        let source = vec![Ok(1), Err(Error::InvalidConfiguration("x".into())), Ok(2)].into_iter();
        let out: Vec<_> = flat_map_ok(source, |n: i64| once(Row::new().with("n", n))).collect();
        assert_eq!(out.len(), 2);
        assert!(out[1].is_err());
    }
}
