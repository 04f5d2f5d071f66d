//! K-way merge over spilled chunks.
//!
//! The heap holds at most one row per open chunk. Ties on the key are broken by chunk
//! index; chunks are cut from the input in order and each is sorted stably, so the merged
//! output keeps the input order of equal keys. Callers keep the number of chunks merged
//! at once within [`MAX_FAN_IN`].

use crate::error::Result;
use crate::row::{KeyVector, Row};
use crate::sort::spill::{ChunkReader, SpilledChunk};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;
use tracing::trace;

/// Most chunks opened by one merge.
pub(crate) const MAX_FAN_IN: usize = 64;

struct Head {
    key: KeyVector,
    chunk: usize,
    row: Row,
}

impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Head {}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Head {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.chunk.cmp(&other.chunk))
    }
}

pub(crate) struct KWayMerge {
    // A slot becomes `None` once its chunk is drained, which deletes the spill file.
    chunks: Vec<Option<ChunkReader>>,
    heap: BinaryHeap<Reverse<Head>>,
    keys: Arc<[String]>,
    failed: bool,
}

impl KWayMerge {
    pub(crate) fn new(chunks: Vec<SpilledChunk>, keys: Arc<[String]>) -> Result<Self> {
        trace!(fan_in = chunks.len(), "starting k-way merge");
        let readers = chunks
            .into_iter()
            .map(|chunk| chunk.open().map(Some))
            .collect::<Result<Vec<_>>>()?;
        let mut merge = Self {
            heap: BinaryHeap::with_capacity(readers.len()),
            chunks: readers,
            keys,
            failed: false,
        };
        for i in 0..merge.chunks.len() {
            merge.refill(i)?;
        }
        Ok(merge)
    }

    /// Pull the next row of chunk `i` into the heap, closing the chunk when it runs dry.
    fn refill(&mut self, i: usize) -> Result<()> {
        let Some(chunk) = self.chunks[i].as_mut() else {
            return Ok(());
        };
        match chunk.next_row()? {
            Some(row) => {
                let key = row.key(&self.keys)?;
                self.heap.push(Reverse(Head { key, chunk: i, row }));
            }
            None => self.chunks[i] = None,
        }
        Ok(())
    }
}

impl Iterator for KWayMerge {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let Reverse(head) = self.heap.pop()?;
        if let Err(e) = self.refill(head.chunk) {
            self.failed = true;
            self.heap.clear();
            self.chunks.clear();
            return Some(Err(e));
        }
        Some(Ok(head.row))
    }
}
