//! External (bounded-memory) sort.
//!
//! The input is cut into chunks of at most `chunk_capacity` rows. Each chunk is sorted in
//! memory with a stable sort on its key vector. If the whole input fits in one chunk it is
//! returned straight from memory; otherwise every chunk is spilled to a temporary file and
//! the files are merged lazily by [`merge::KWayMerge`], one row of lookahead per chunk.
//! When there are more than [`merge::MAX_FAN_IN`] spill files, consecutive groups are
//! merged into new spill files first, pass by pass, until one merge can cover them all.
//!
//! Nothing is read from the input until the first row is requested. Spill files belong to
//! the returned stream and are deleted when it is dropped, exhausted or not.

mod merge;
mod spill;

use crate::config::SortConfig;
use crate::error::Result;
use crate::row::{KeyVector, Row};
use crate::stream::RowStream;
use merge::{KWayMerge, MAX_FAN_IN};
use spill::{SpilledChunk, spill};
use std::sync::Arc;
use tracing::debug;

/// Sort `input` by `keys`, ties kept in input order.
pub(crate) fn external_sort(input: RowStream, keys: Arc<[String]>, config: SortConfig) -> RowStream {
    Box::new(ExternalSort {
        keys,
        config,
        state: State::Pending(input),
    })
}

enum State {
    Pending(RowStream),
    InMemory(std::vec::IntoIter<(KeyVector, Row)>),
    Merging(KWayMerge),
    Done,
}

struct ExternalSort {
    keys: Arc<[String]>,
    config: SortConfig,
    state: State,
}

fn sort_chunk(chunk: &mut [(KeyVector, Row)]) {
    // `sort_by` is stable; equal keys keep their input order.
    chunk.sort_by(|a, b| a.0.cmp(&b.0));
}

impl ExternalSort {
    fn spill_chunk(&self, chunk: &mut Vec<(KeyVector, Row)>) -> Result<SpilledChunk> {
        sort_chunk(chunk);
        spill(&self.config.spill_path(), chunk.drain(..).map(|(_, row)| Ok(row)))
    }

    /// Merge consecutive groups of chunks until at most `MAX_FAN_IN` remain.
    ///
    /// Groups are contiguous and stay in order, so ties keep their input order.
    fn reduce_fan_in(&self, mut spilled: Vec<SpilledChunk>) -> Result<Vec<SpilledChunk>> {
        let dir = self.config.spill_path();
        while spilled.len() > MAX_FAN_IN {
            debug!(chunks = spilled.len(), "intermediate merge pass");
            let mut next = Vec::with_capacity(spilled.len().div_ceil(MAX_FAN_IN));
            let mut pending = spilled.into_iter();
            loop {
                let group: Vec<SpilledChunk> = pending.by_ref().take(MAX_FAN_IN).collect();
                if group.is_empty() {
                    break;
                }
                next.push(spill(&dir, KWayMerge::new(group, Arc::clone(&self.keys))?)?);
            }
            spilled = next;
        }
        Ok(spilled)
    }

    /// Drain the input into sorted chunks and pick the read-back strategy.
    fn prepare(&self, input: RowStream) -> Result<State> {
        let capacity = self.config.chunk_capacity.max(1);
        let mut chunk: Vec<(KeyVector, Row)> = Vec::with_capacity(capacity.min(4096));
        let mut spilled: Vec<SpilledChunk> = Vec::new();

        for item in input {
            let row = item?;
            let key = row.key(&self.keys)?;
            // Spill only once a row overflows the chunk, so an input of exactly
            // `capacity` rows stays in memory.
            if chunk.len() == capacity {
                spilled.push(self.spill_chunk(&mut chunk)?);
            }
            chunk.push((key, row));
        }

        if spilled.is_empty() {
            sort_chunk(&mut chunk);
            debug!(rows = chunk.len(), keys = ?self.keys, "sorted in memory");
            return Ok(State::InMemory(chunk.into_iter()));
        }
        if !chunk.is_empty() {
            spilled.push(self.spill_chunk(&mut chunk)?);
        }
        let spilled = self.reduce_fan_in(spilled)?;
        debug!(chunks = spilled.len(), keys = ?self.keys, "merging spilled chunks");
        Ok(State::Merging(KWayMerge::new(spilled, Arc::clone(&self.keys))?))
    }
}

impl Iterator for ExternalSort {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if let State::Pending(_) = self.state {
            if let State::Pending(input) = std::mem::replace(&mut self.state, State::Done) {
                match self.prepare(input) {
                    Ok(state) => self.state = state,
                    Err(e) => return Some(Err(e)),
                }
            }
        }
        match &mut self.state {
            State::InMemory(rows) => rows.next().map(|(_, row)| Ok(row)),
            State::Merging(merge) => {
                let next = merge.next();
                if next.is_none() {
                    // Release the merge (and any spill handles) promptly.
                    self.state = State::Done;
                }
                next
            }
            State::Pending(_) | State::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::from_rows;

    fn run(values: &[(i64, &str)], capacity: usize, dir: &std::path::Path) -> Vec<Row> {
        let rows = values
            .iter()
            .map(|(k, tag)| Row::new().with("k", *k).with("tag", *tag))
            .collect();
        let cfg = SortConfig::with_chunk_capacity(capacity).unwrap().spill_dir(dir);
        external_sort(from_rows(rows), Arc::from(vec!["k".to_string()]), cfg)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn input_of_exactly_one_chunk_does_not_spill() {
        let dir = tempfile::tempdir().unwrap();
        let mut sorter = ExternalSort {
            keys: Arc::from(vec!["k".to_string()]),
            config: SortConfig::with_chunk_capacity(3).unwrap().spill_dir(dir.path()),
            state: State::Pending(from_rows(
                (0..3).map(|i| Row::new().with("k", 3 - i)).collect(),
            )),
        };
        assert!(sorter.next().is_some());
        assert!(matches!(sorter.state, State::InMemory(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn stable_for_every_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let input = [(2, "a"), (1, "b"), (2, "c"), (1, "d"), (0, "e"), (2, "f")];
        for capacity in 1..=input.len() + 1 {
            let tags: Vec<String> = run(&input, capacity, dir.path())
                .iter()
                .map(|r| r.require_str("tag").unwrap().to_string())
                .collect();
            assert_eq!(tags, vec!["e", "b", "d", "a", "c", "f"], "capacity {capacity}");
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn many_chunks_merge_in_several_passes() {
        let dir = tempfile::tempdir().unwrap();
        let n = MAX_FAN_IN * MAX_FAN_IN + 3;
        let tags: Vec<String> = (0..n).map(|i| format!("{i:05}")).collect();
        let input: Vec<(i64, &str)> = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| ((i % 5) as i64, tag.as_str()))
            .collect();
        let out = run(&input, 1, dir.path());
        let mut expected = input.clone();
        expected.sort_by_key(|(k, _)| *k);
        let got: Vec<(i64, &str)> = out
            .iter()
            .map(|r| (r.require_f64("k").unwrap() as i64, r.require_str("tag").unwrap()))
            .collect();
        assert_eq!(got, expected);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn input_is_not_read_until_first_pull() {
        let pulled = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&pulled);
        let input: RowStream = Box::new(std::iter::once_with(move || {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(Row::new().with("k", 1))
        }));
        let mut sorted = external_sort(input, Arc::from(vec!["k".to_string()]), SortConfig::default());
        assert!(!pulled.load(std::sync::atomic::Ordering::SeqCst));
        assert!(sorted.next().is_some());
        assert!(pulled.load(std::sync::atomic::Ordering::SeqCst));
    }
}
