//! File-backed sources and sinks.
//!
//! - [`read_lines`] turns a text file into a lazy row stream using a line parser
//! - [`jsonl`] holds the JSON-lines parser and writer
//! - [`compression`] picks a codec by extension or magic bytes

pub mod compression;
pub mod jsonl;

use crate::error::{Error, Result};
use crate::node::LineParser;
use crate::row::Row;
use crate::stream::RowStream;
use std::io::{BufRead, Lines};
use std::path::PathBuf;

/// Stream the rows of a text file, one per non-blank line.
///
/// The file is opened on the first pull. A line the parser rejects yields
/// [`Error::MalformedInput`] with its 1-based line number and ends the stream.
#[must_use]
pub fn read_lines(path: PathBuf, parser: LineParser) -> RowStream {
    Box::new(LineSource {
        state: LineState::Pending,
        path,
        parser,
        line: 0,
    })
}

enum LineState {
    Pending,
    Open(Lines<Box<dyn BufRead>>),
    Done,
}

struct LineSource {
    state: LineState,
    path: PathBuf,
    parser: LineParser,
    line: usize,
}

impl LineSource {
    fn fail(&mut self, err: Error) -> Option<Result<Row>> {
        self.state = LineState::Done;
        Some(Err(err))
    }
}

impl Iterator for LineSource {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if let LineState::Pending = self.state {
            tracing::debug!(path = %self.path.display(), "opening file source");
            match compression::open_reader(&self.path) {
                Ok(reader) => self.state = LineState::Open(reader.lines()),
                Err(e) => return self.fail(e),
            }
        }
        let LineState::Open(lines) = &mut self.state else {
            return None;
        };
        loop {
            let text = match lines.next() {
                Some(Ok(text)) => text,
                Some(Err(source)) => {
                    let path = self.path.clone();
                    return self.fail(Error::Io { path, source });
                }
                None => {
                    self.state = LineState::Done;
                    return None;
                }
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            return match (self.parser)(&text) {
                Ok(row) => Some(Ok(row)),
                Err(message) => {
                    let err = Error::malformed(self.path.display().to_string(), self.line, message);
                    self.fail(err)
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn file_is_opened_on_the_first_pull() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.jsonl");
        let mut stream = read_lines(path.clone(), jsonl::parser());
        // Created after the stream was built, before it was pulled.
        std::fs::write(&path, "{\"a\":1}\n").unwrap();
        assert_eq!(stream.next().unwrap().unwrap(), Row::new().with("a", 1));
        assert!(stream.next().is_none());
    }

    #[test]
    fn missing_file_errors_once_on_the_first_pull() {
        let path = PathBuf::from("/nonexistent/rowgraph.jsonl");
        let mut stream = read_lines(path.clone(), jsonl::parser());
        assert!(matches!(stream.next(), Some(Err(Error::Io { path: p, .. })) if p == path));
        assert!(stream.next().is_none());
    }

    #[test]
    fn malformed_line_carries_its_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.jsonl");
        std::fs::write(&path, "{\"a\":1}\n\n{oops}\n{\"a\":3}\n").unwrap();
        let items: Vec<_> = read_lines(path, jsonl::parser()).collect();
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(Error::MalformedInput { line: 3, .. })));
    }

    #[test]
    fn custom_parser() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "alpha\nbeta\n").unwrap();
        let parser: LineParser =
            Arc::new(|line: &str| -> std::result::Result<Row, String> { Ok(Row::new().with("word", line)) });
        let rows: Vec<Row> = read_lines(path, parser).collect::<Result<_>>().unwrap();
        assert_eq!(rows, vec![Row::new().with("word", "alpha"), Row::new().with("word", "beta")]);
    }
}
