//! JSON-lines rows: one JSON object per line.
//!
//! Integers stay [`Value::Int`](crate::Value::Int), other numbers become floats, numeric
//! arrays become lists. Timestamps are written as strings.

use crate::error::{Error, Result};
use crate::io::compression::create_writer;
use crate::node::LineParser;
use crate::row::Row;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Parse one JSON object into a row, keeping the key order of the line.
pub fn parse_row(line: &str) -> std::result::Result<Row, String> {
    let json: serde_json::Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
    Row::from_json(json)
}

/// [`parse_row`] as a file-source parser.
#[must_use]
pub fn parser() -> LineParser {
    Arc::new(parse_row)
}

/// Write rows as JSON lines, stopping at the first row error.
///
/// `destination` only labels I/O errors. Returns the number of rows written.
pub fn write_rows<W, I>(mut writer: W, rows: I, destination: &Path) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Result<Row>>,
{
    let io = |source: std::io::Error| Error::Io {
        path: destination.to_path_buf(),
        source,
    };
    let mut written = 0;
    for row in rows {
        serde_json::to_writer(&mut writer, &row?.to_json()).map_err(|e| io(e.into()))?;
        writer.write_all(b"\n").map_err(io)?;
        written += 1;
    }
    writer.flush().map_err(io)?;
    Ok(written)
}

/// Write rows to `path`, compressed if its extension names a codec.
pub fn write_file<I>(path: &Path, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = Result<Row>>,
{
    write_rows(create_writer(path)?, rows, path)
}
