//! Reading and writing documents through `std::io` and the filesystem.
//!
//! Every failure of the underlying stream or file surfaces as [`Error::Io`].

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::{decode, encode, Document, Error, Result};

/// Writes the compact encoding of `doc` to `writer`.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::{io::to_writer, Document, Graph, Value};
///
/// let doc = Document::new(Graph::new(), Value::from("hi"));
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &doc).unwrap();
/// assert_eq!(buffer, br#""hi""#);
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails.
pub fn to_writer<W>(mut writer: W, doc: &Document) -> Result<()>
where
    W: Write,
{
    writer
        .write_all(encode(doc).as_bytes())
        .map_err(|e| Error::io(&e.to_string()))
}

/// Reads all of `reader` and decodes it.
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails or the bytes are not UTF-8, and any
/// syntax error from [`decode`].
pub fn from_reader<R>(mut reader: R) -> Result<Document>
where
    R: Read,
{
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| Error::io(&e.to_string()))?;
    decode(&text)
}

/// Encodes `doc` into the file at `path`, replacing it. Returns the number of
/// bytes written.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be written.
pub fn write_file<P>(path: P, doc: &Document) -> Result<usize>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = encode(doc);
    fs::write(path, text.as_bytes())
        .map_err(|e| Error::io(&format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), bytes = text.len(), "wrote document");
    Ok(text.len())
}

/// Reads and decodes the file at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, and any syntax error from
/// [`decode`].
pub fn read_file<P>(path: P) -> Result<Document>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| Error::io(&format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), bytes = text.len(), "read document");
    decode(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Graph, Value};

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_failure_is_io_error() {
        let doc = Document::new(Graph::new(), Value::from(1));
        let err = to_writer(FailingWriter, &doc).unwrap_err();
        assert!(matches!(err, Error::Io(msg) if msg.contains("disk full")));
    }

    #[test]
    fn test_reader_round_trip() {
        let doc = decode(r#"{"a":[1,2],"b":$2}"#).unwrap();
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &doc).unwrap();
        assert_eq!(from_reader(buffer.as_slice()).unwrap(), doc);
    }

    #[test]
    fn test_reader_rejects_invalid_utf8() {
        let bytes: &[u8] = &[b'"', 0xff, b'"'];
        assert!(matches!(from_reader(bytes), Err(Error::Io(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("serde_refjson_missing_file_test.rj");
        let _ = fs::remove_file(&path);
        assert!(matches!(read_file(&path), Err(Error::Io(_))));
    }
}
