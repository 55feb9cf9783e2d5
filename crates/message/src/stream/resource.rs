use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::StreamError;

use super::OpenMode;

/// An open byte channel owned by at most one [`ByteStream`](super::ByteStream).
pub struct Resource {
    kind: Kind,
    mode: OpenMode,
    uri: Option<String>,
}

enum Kind {
    Memory(Cursor<Vec<u8>>),
    File(File),
    Reader(Box<dyn Read + Send>),
}

impl Resource {
    /// Creates an in-memory resource holding `data`, positioned at the start.
    pub fn memory(data: impl Into<Vec<u8>>) -> Self {
        Self { kind: Kind::Memory(Cursor::new(data.into())), mode: OpenMode::read_write(), uri: None }
    }

    /// Opens the file at `path` with an `fopen` style `mode`.
    ///
    /// # Errors
    ///
    /// Fails on an unknown mode or when the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, StreamError> {
        let path = path.as_ref();
        let mode = OpenMode::parse(mode)?;
        let file = mode.open_options().open(path)?;

        trace!(path = %path.display(), mode = mode.as_str(), "opened file resource");
        Ok(Self { kind: Kind::File(file), mode, uri: Some(path.display().to_string()) })
    }

    /// Wraps an already open file. `mode` must describe how it was opened.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidMode`] on an unknown mode.
    pub fn from_file(file: File, mode: &str, path: Option<PathBuf>) -> Result<Self, StreamError> {
        let mode = OpenMode::parse(mode)?;
        Ok(Self { kind: Kind::File(file), mode, uri: path.map(|path| path.display().to_string()) })
    }

    /// Wraps a forward-only reader, such as a socket or a pipe.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self { kind: Kind::Reader(Box::new(reader)), mode: OpenMode::read_only(), uri: None }
    }

    pub fn mode(&self) -> &OpenMode {
        &self.mode
    }

    /// Where the resource came from, when it has a location.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn is_seekable(&self) -> bool {
        !matches!(self.kind, Kind::Reader(_))
    }

    pub fn stream_type(&self) -> &'static str {
        match self.kind {
            Kind::Memory(_) => "MEMORY",
            Kind::File(_) => "STDIO",
            Kind::Reader(_) => "READER",
        }
    }

    /// Stats the resource. `None` when the size of the channel is unknowable.
    pub(crate) fn len(&self) -> io::Result<Option<u64>> {
        match &self.kind {
            Kind::Memory(cursor) => Ok(Some(cursor.get_ref().len() as u64)),
            Kind::File(file) => file.metadata().map(|metadata| Some(metadata.len())),
            Kind::Reader(_) => Ok(None),
        }
    }
}

impl Read for Resource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.kind {
            Kind::Memory(cursor) => cursor.read(buf),
            Kind::File(file) => file.read(buf),
            Kind::Reader(reader) => reader.read(buf),
        }
    }
}

impl Write for Resource {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.kind {
            Kind::Memory(cursor) => cursor.write(buf),
            Kind::File(file) => file.write(buf),
            Kind::Reader(_) => Err(io::Error::new(io::ErrorKind::Unsupported, "reader resource is read only")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.kind {
            Kind::Memory(_) | Kind::Reader(_) => Ok(()),
            Kind::File(file) => file.flush(),
        }
    }
}

impl Seek for Resource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.kind {
            Kind::Memory(cursor) => cursor.seek(pos),
            Kind::File(file) => file.seek(pos),
            Kind::Reader(_) => Err(io::Error::new(io::ErrorKind::Unsupported, "reader resource is not seekable")),
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("stream_type", &self.stream_type())
            .field("mode", &self.mode.as_str())
            .field("uri", &self.uri)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_resource() {
        let mut resource = Resource::memory(b"abc".to_vec());
        assert!(resource.is_seekable());
        assert_eq!(resource.len().unwrap(), Some(3));
        assert_eq!(resource.stream_type(), "MEMORY");

        resource.seek(SeekFrom::End(0)).unwrap();
        resource.write_all(b"def").unwrap();
        assert_eq!(resource.len().unwrap(), Some(6));
    }

    #[test]
    fn test_reader_resource() {
        let mut resource = Resource::from_reader(io::repeat(b'x').take(4));
        assert!(!resource.is_seekable());
        assert_eq!(resource.len().unwrap(), None);
        assert!(resource.write(b"no").is_err());
        assert!(resource.seek(SeekFrom::Start(0)).is_err());

        let mut buf = Vec::new();
        resource.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"xxxx");
    }
}
