//! Transparent compression for file sources and outputs.
//!
//! The codec is chosen from the file extension first and, for readers, from the magic
//! bytes at the start of the stream when the extension is not recognized. Files with no
//! recognized codec are read and written as-is.
//!
//! | Codec | Extensions | Feature |
//! |---|---|---|
//! | gzip | `.gz`, `.gzip` | `compression-gzip` |
//! | zstd | `.zst`, `.zstd` | `compression-zstd` |

use crate::error::{Error, Result};
use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A supported compression format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codec {
    #[cfg(feature = "compression-gzip")]
    Gzip,
    #[cfg(feature = "compression-zstd")]
    Zstd,
}

impl Codec {
    /// Codecs compiled into this build.
    pub const ALL: &'static [Codec] = &[
        #[cfg(feature = "compression-gzip")]
        Codec::Gzip,
        #[cfg(feature = "compression-zstd")]
        Codec::Zstd,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "compression-gzip")]
            Codec::Gzip => "gzip",
            #[cfg(feature = "compression-zstd")]
            Codec::Zstd => "zstd",
        }
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "compression-gzip")]
            Codec::Gzip => &[".gz", ".gzip"],
            #[cfg(feature = "compression-zstd")]
            Codec::Zstd => &[".zst", ".zstd"],
        }
    }

    fn magic_bytes(self) -> &'static [u8] {
        match self {
            #[cfg(feature = "compression-gzip")]
            Codec::Gzip => &[0x1f, 0x8b],
            #[cfg(feature = "compression-zstd")]
            Codec::Zstd => &[0x28, 0xb5, 0x2f, 0xfd],
        }
    }

    /// Codec implied by the file name, case-insensitive.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Codec> {
        let name = path.to_string_lossy().to_lowercase();
        Codec::ALL
            .iter()
            .copied()
            .find(|c| c.extensions().iter().any(|ext| name.ends_with(ext)))
    }

    fn from_magic(head: &[u8]) -> Option<Codec> {
        Codec::ALL
            .iter()
            .copied()
            .find(|c| head.starts_with(c.magic_bytes()))
    }

    fn decoder(self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        match self {
            #[cfg(feature = "compression-gzip")]
            Codec::Gzip => Ok(Box::new(flate2::read::MultiGzDecoder::new(reader))),
            #[cfg(feature = "compression-zstd")]
            Codec::Zstd => Ok(Box::new(zstd::stream::read::Decoder::new(reader)?)),
        }
    }

    fn encoder(self, writer: Box<dyn Write>) -> std::io::Result<Box<dyn Write>> {
        match self {
            #[cfg(feature = "compression-gzip")]
            Codec::Gzip => Ok(Box::new(flate2::write::GzEncoder::new(
                writer,
                flate2::Compression::default(),
            ))),
            #[cfg(feature = "compression-zstd")]
            Codec::Zstd => Ok(Box::new(
                zstd::stream::write::Encoder::new(writer, 3)?.auto_finish(),
            )),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Open `path` for line reading, decompressing if needed.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(io_error(path))?;
    let mut buffered = BufReader::new(file);
    let codec = match Codec::from_path(path) {
        Some(codec) => Some(codec),
        None => Codec::from_magic(buffered.fill_buf().map_err(io_error(path))?),
    };
    match codec {
        Some(codec) => {
            tracing::debug!(path = %path.display(), codec = codec.name(), "decompressing source");
            let decoded = codec.decoder(Box::new(buffered)).map_err(io_error(path))?;
            Ok(Box::new(BufReader::new(decoded)))
        }
        None => Ok(Box::new(buffered)),
    }
}

/// Create `path` (and its parent directories) for writing, compressing by extension.
pub fn create_writer(path: &Path) -> Result<Box<dyn Write>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).map_err(io_error(parent))?;
    }
    let file = BufWriter::new(File::create(path).map_err(io_error(path))?);
    match Codec::from_path(path) {
        Some(codec) => codec.encoder(Box::new(file)).map_err(io_error(path)),
        None => Ok(Box::new(file)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_files_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        std::fs::write(&path, "hello\n").unwrap();
        let mut text = String::new();
        open_reader(&path).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "hello\n");
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn gzip_round_trip_and_magic_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.jsonl.gz");
        {
            let mut w = create_writer(&path).unwrap();
            w.write_all(b"{\"a\":1}\n").unwrap();
        }
        // Same bytes under a name without the extension.
        let renamed = dir.path().join("data.bin");
        std::fs::copy(&path, &renamed).unwrap();
        for p in [&path, &renamed] {
            let mut text = String::new();
            open_reader(p).unwrap().read_to_string(&mut text).unwrap();
            assert_eq!(text, "{\"a\":1}\n");
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let err = open_reader(Path::new("/nonexistent/rowgraph/input.jsonl")).err().unwrap();
        assert!(matches!(err, Error::Io { ref path, .. } if path.ends_with("input.jsonl")));
    }
}
