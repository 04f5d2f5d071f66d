//! Spill files: sorted runs written to temporary storage and read back in order.
//!
//! Each frame is a little-endian `u32` length followed by the row encoded with
//! `postcard`. A written chunk keeps only its [`TempPath`], so it holds no file
//! descriptor until [`SpilledChunk::open`] is called. The file is deleted when the path
//! is dropped, whether the merge ran to the end or the consumer walked away early.

use crate::error::Result;
use crate::row::Row;
use std::fs::{File, create_dir_all};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::{Builder, TempPath};
use tracing::{debug, trace};

/// A sorted run on disk, not yet opened for reading.
pub(crate) struct SpilledChunk {
    path: TempPath,
    rows: usize,
}

/// Write `rows` (already sorted) to a fresh spill file in `dir`.
///
/// Stops at the first row error; the partial file is removed.
pub(crate) fn spill<I>(dir: &Path, rows: I) -> Result<SpilledChunk>
where
    I: IntoIterator<Item = Result<Row>>,
{
    create_dir_all(dir)?;
    let file = Builder::new().prefix("rowgraph-sort-").suffix(".spill").tempfile_in(dir)?;
    let mut count = 0;
    {
        let mut w = BufWriter::new(file.as_file());
        for row in rows {
            let bytes = postcard::to_allocvec(&row?)?;
            let len = u32::try_from(bytes.len()).map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::InvalidData, "row too large to spill")
            })?;
            w.write_all(&len.to_le_bytes())?;
            w.write_all(&bytes)?;
            count += 1;
        }
        w.flush()?;
    }
    debug!(rows = count, path = %file.path().display(), "spilled sorted chunk");
    Ok(SpilledChunk {
        path: file.into_temp_path(),
        rows: count,
    })
}

impl SpilledChunk {
    pub(crate) fn open(self) -> Result<ChunkReader> {
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(ChunkReader {
            reader,
            path: self.path,
            remaining: self.rows,
            buf: Vec::new(),
        })
    }
}

/// An opened spill file, streamed back once.
pub(crate) struct ChunkReader {
    reader: BufReader<File>,
    path: TempPath,
    remaining: usize,
    buf: Vec<u8>,
}

impl ChunkReader {
    /// Next row in chunk order, `None` once every spilled row has been read.
    pub(crate) fn next_row(&mut self) -> Result<Option<Row>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let mut len = [0u8; 4];
        self.reader.read_exact(&mut len)?;
        self.buf.resize(u32::from_le_bytes(len) as usize, 0);
        self.reader.read_exact(&mut self.buf)?;
        self.remaining -= 1;
        Ok(Some(postcard::from_bytes(&self.buf)?))
    }
}

impl Drop for ChunkReader {
    fn drop(&mut self) {
        trace!(path = %self.path.display(), unread = self.remaining, "removing spill file");
    }
}
