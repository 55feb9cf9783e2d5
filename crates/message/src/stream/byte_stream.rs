use std::cell::Cell;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tracing::trace;

use crate::ensure;
use crate::error::StreamError;

use super::Resource;

/// Upper bound of a single read while copying between streams.
pub const COPY_CHUNK_SIZE: usize = 1024 * 1024;

/// A stream bound to one [`Resource`].
///
/// Capabilities are fixed when the resource is bound. After [`close`](Self::close)
/// or [`detach`](Self::detach) every capability query reports `false` and
/// every I/O operation fails.
#[derive(Debug)]
pub struct ByteStream {
    resource: Option<Resource>,
    size: Cell<Option<u64>>,
    position: u64,
    eof: bool,
    seekable: bool,
    readable: bool,
    writable: bool,
    uri: Option<String>,
}

/// Metadata of a bound stream, see [`ByteStream::metadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamMetadata {
    pub stream_type: &'static str,
    pub mode: String,
    pub seekable: bool,
    pub uri: Option<String>,
    pub eof: bool,
}

impl ByteStream {
    /// Binds a stream to `resource`, taking ownership of it.
    ///
    /// A seekable resource keeps its current offset as the stream position.
    pub fn new(mut resource: Resource) -> Self {
        let seekable = resource.is_seekable();
        let position = if seekable { resource.stream_position().unwrap_or(0) } else { 0 };

        Self {
            seekable,
            readable: resource.mode().is_readable(),
            writable: resource.mode().is_writable(),
            uri: resource.uri().map(str::to_string),
            resource: Some(resource),
            size: Cell::new(None),
            position,
            eof: false,
        }
    }

    /// Materializes `data` into a fresh in-memory resource.
    pub fn from_bytes(data: impl AsRef<[u8]>) -> Self {
        Self::new(Resource::memory(data.as_ref().to_vec()))
    }

    /// An empty, readable and writable in-memory stream.
    pub fn empty() -> Self {
        Self::new(Resource::memory(Vec::new()))
    }

    /// Opens the file at `path` with an `fopen` style mode.
    ///
    /// # Errors
    ///
    /// Fails on an unknown mode or when the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, StreamError> {
        Resource::open(path, mode).map(Self::new)
    }

    /// Wraps a forward-only reader; the stream is readable only.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self::new(Resource::from_reader(reader))
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    /// Returns the size of the resource, stat'ed once and cached until the next write.
    pub fn size(&self) -> Option<u64> {
        if let Some(size) = self.size.get() {
            return Some(size);
        }

        let size = self.resource.as_ref()?.len().ok().flatten();
        self.size.set(size);
        size
    }

    /// Returns the current position.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Detached`] when no resource is bound.
    pub fn tell(&self) -> Result<u64, StreamError> {
        ensure!(self.resource.is_some(), StreamError::Detached);
        Ok(self.position)
    }

    /// Whether the end of the stream has been reached. A detached stream is always at the end.
    pub fn eof(&self) -> bool {
        if self.resource.is_none() || self.eof {
            return true;
        }

        self.seekable && self.size().is_some_and(|size| self.position >= size)
    }

    /// Seeks to `pos`, returning the new position.
    ///
    /// # Errors
    ///
    /// Fails when the stream is not seekable or the underlying seek fails.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, StreamError> {
        ensure!(self.seekable, StreamError::NotSeekable);
        let resource = self.resource.as_mut().ok_or(StreamError::Detached)?;

        self.position = resource.seek(pos)?;
        self.eof = false;
        Ok(self.position)
    }

    /// Seeks back to the start of the stream.
    ///
    /// # Errors
    ///
    /// Fails when the stream is not seekable.
    pub fn rewind(&mut self) -> Result<(), StreamError> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Reads up to `len` bytes. Fewer bytes are returned only at the end of the stream.
    ///
    /// # Errors
    ///
    /// Fails when the stream is not readable, `len` is zero, or the read fails.
    pub fn read(&mut self, len: usize) -> Result<Bytes, StreamError> {
        ensure!(self.readable, StreamError::NotReadable);
        ensure!(len > 0, StreamError::ZeroLengthRead);
        let resource = self.resource.as_mut().ok_or(StreamError::Detached)?;

        let mut buf = Vec::with_capacity(len.min(COPY_CHUNK_SIZE));
        let read = Read::by_ref(resource).take(len as u64).read_to_end(&mut buf)?;

        self.position += read as u64;
        if read < len {
            self.eof = true;
        }

        Ok(Bytes::from(buf))
    }

    /// Reads everything from the current position to the end.
    ///
    /// # Errors
    ///
    /// Fails when the stream is not readable or the read fails.
    pub fn contents(&mut self) -> Result<Bytes, StreamError> {
        ensure!(self.readable, StreamError::NotReadable);
        let resource = self.resource.as_mut().ok_or(StreamError::Detached)?;

        let mut buf = Vec::new();
        let read = resource.read_to_end(&mut buf)?;

        self.position += read as u64;
        self.eof = true;
        Ok(Bytes::from(buf))
    }

    /// Writes `data` at the current position, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Fails when the stream is not writable or the write fails.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, StreamError> {
        ensure!(self.writable, StreamError::NotWritable);
        let resource = self.resource.as_mut().ok_or(StreamError::Detached)?;

        self.size.set(None);
        resource.write_all(data)?;

        // append mode moves the position to the end before writing
        self.position = if self.seekable { resource.stream_position()? } else { self.position + data.len() as u64 };
        Ok(data.len())
    }

    /// Returns the metadata of the bound resource, or `None` once detached.
    pub fn metadata(&self) -> Option<StreamMetadata> {
        let resource = self.resource.as_ref()?;

        Some(StreamMetadata {
            stream_type: resource.stream_type(),
            mode: resource.mode().as_str().to_string(),
            seekable: self.seekable,
            uri: self.uri.clone(),
            eof: self.eof(),
        })
    }

    /// Returns one metadata entry by key, such as `"mode"` or `"seekable"`.
    pub fn metadata_value(&self, key: &str) -> Option<serde_json::Value> {
        let metadata = serde_json::to_value(self.metadata()?).ok()?;
        metadata.get(key).cloned()
    }

    /// Closes the resource. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.detach().is_some() {
            trace!("stream closed");
        }
    }

    /// Unbinds the resource and hands it to the caller without closing it.
    ///
    /// Returns `None` when nothing is bound.
    pub fn detach(&mut self) -> Option<Resource> {
        let resource = self.resource.take()?;

        self.size.set(None);
        self.position = 0;
        self.eof = false;
        self.uri = None;
        self.readable = false;
        self.writable = false;
        self.seekable = false;

        trace!(stream_type = resource.stream_type(), "stream detached");
        Some(resource)
    }

    /// Copies from this stream into `dest` until `max_len` bytes are copied
    /// or this stream is exhausted. `None` copies everything.
    ///
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Fails on the first read or write error.
    pub fn copy_to(&mut self, dest: &mut ByteStream, max_len: Option<u64>) -> Result<u64, StreamError> {
        let mut copied = 0u64;

        while !self.eof() {
            let want = match max_len {
                Some(max) if copied >= max => break,
                Some(max) => usize::try_from(max - copied).unwrap_or(COPY_CHUNK_SIZE).min(COPY_CHUNK_SIZE),
                None => COPY_CHUNK_SIZE,
            };

            let chunk = self.read(want)?;
            if chunk.is_empty() {
                break;
            }

            copied += dest.write(&chunk)? as u64;
        }

        trace!(copied, "copied between streams");
        Ok(copied)
    }
}

impl From<Resource> for ByteStream {
    fn from(resource: Resource) -> Self {
        Self::new(resource)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_capabilities() {
        let stream = ByteStream::from_bytes("abc");
        assert!(stream.is_readable());
        assert!(stream.is_writable());
        assert!(stream.is_seekable());
        assert_eq!(stream.size(), Some(3));

        let stream = ByteStream::from_reader(io::empty());
        assert!(stream.is_readable());
        assert!(!stream.is_writable());
        assert!(!stream.is_seekable());
        assert_eq!(stream.size(), None);
    }

    #[test]
    fn test_read_and_eof() {
        let mut stream = ByteStream::from_bytes("hello world");
        assert!(!stream.eof());

        assert_eq!(&stream.read(5).unwrap()[..], b"hello");
        assert_eq!(stream.tell().unwrap(), 5);
        assert!(!stream.eof());

        assert_eq!(&stream.read(100).unwrap()[..], b" world");
        assert!(stream.eof());

        stream.rewind().unwrap();
        assert!(!stream.eof());
        assert_eq!(&stream.contents().unwrap()[..], b"hello world");
    }

    #[test]
    fn test_zero_length_read() {
        let mut stream = ByteStream::from_bytes("abc");
        assert!(matches!(stream.read(0), Err(StreamError::ZeroLengthRead)));
    }

    #[test]
    fn test_write_invalidates_size() {
        let mut stream = ByteStream::empty();
        assert_eq!(stream.size(), Some(0));

        assert_eq!(stream.write(b"12345").unwrap(), 5);
        assert_eq!(stream.size(), Some(5));
        assert_eq!(stream.tell().unwrap(), 5);

        stream.seek(SeekFrom::Start(2)).unwrap();
        stream.write(b"ab").unwrap();
        stream.rewind().unwrap();
        assert_eq!(&stream.contents().unwrap()[..], b"12ab5");
    }

    #[test]
    fn test_reader_is_not_writable_or_seekable() {
        let mut stream = ByteStream::from_reader(io::repeat(b'z').take(3));

        assert!(matches!(stream.write(b"x"), Err(StreamError::NotWritable)));
        assert!(matches!(stream.seek(SeekFrom::Start(0)), Err(StreamError::NotSeekable)));
        assert!(matches!(stream.rewind(), Err(StreamError::NotSeekable)));

        assert_eq!(&stream.read(2).unwrap()[..], b"zz");
        assert_eq!(stream.tell().unwrap(), 2);
        assert!(!stream.eof());
        assert_eq!(&stream.read(2).unwrap()[..], b"z");
        assert!(stream.eof());
    }

    #[test]
    fn test_detach_and_close() {
        let mut stream = ByteStream::from_bytes("abc");

        let resource = stream.detach();
        assert!(resource.is_some());
        assert!(stream.detach().is_none());

        assert!(!stream.is_readable());
        assert!(!stream.is_writable());
        assert!(!stream.is_seekable());
        assert!(stream.eof());
        assert_eq!(stream.size(), None);
        assert_eq!(stream.metadata(), None);
        assert_eq!(stream.metadata_value("mode"), None);
        assert!(matches!(stream.tell(), Err(StreamError::Detached)));
        assert!(matches!(stream.read(1), Err(StreamError::NotReadable)));

        // the detached resource is still usable by its new owner
        let mut rebound = ByteStream::new(resource.unwrap());
        assert_eq!(&rebound.contents().unwrap()[..], b"abc");

        rebound.close();
        rebound.close();
        assert!(!rebound.is_readable());
    }

    #[test]
    fn test_metadata() {
        let stream = ByteStream::from_bytes("abc");
        let metadata = stream.metadata().unwrap();

        assert_eq!(metadata.stream_type, "MEMORY");
        assert_eq!(metadata.mode, "w+b");
        assert!(metadata.seekable);

        assert_eq!(stream.metadata_value("mode"), Some(serde_json::Value::from("w+b")));
        assert_eq!(stream.metadata_value("seekable"), Some(serde_json::Value::Bool(true)));
        assert_eq!(stream.metadata_value("missing"), None);
    }

    #[test]
    fn test_copy_bounded() {
        let mut source = ByteStream::from_bytes([7u8; 100]);
        let mut dest = ByteStream::empty();

        assert_eq!(source.copy_to(&mut dest, Some(10)).unwrap(), 10);
        assert_eq!(dest.size(), Some(10));
        assert_eq!(source.tell().unwrap(), 10);
    }

    #[test]
    fn test_copy_unbounded() {
        let mut source = ByteStream::from_reader(io::repeat(b'a').take(3 * 1024));
        let mut dest = ByteStream::empty();

        assert_eq!(source.copy_to(&mut dest, None).unwrap(), 3 * 1024);
        assert_eq!(dest.size(), Some(3 * 1024));
        assert!(source.eof());
    }

    #[test]
    fn test_copy_bound_larger_than_source() {
        let mut source = ByteStream::from_bytes("short");
        let mut dest = ByteStream::empty();

        assert_eq!(source.copy_to(&mut dest, Some(1000)).unwrap(), 5);
        assert_eq!(source.copy_to(&mut dest, Some(0)).unwrap(), 0);
    }

    #[test]
    fn test_copy_into_read_only_fails() {
        let mut source = ByteStream::from_bytes("data");
        let mut dest = ByteStream::from_reader(io::empty());

        assert!(matches!(source.copy_to(&mut dest, None), Err(StreamError::NotWritable)));
    }

    #[test]
    fn test_file_stream() {
        let path = std::env::temp_dir().join(format!("micro-message-stream-{}.txt", std::process::id()));

        let mut stream = ByteStream::open(&path, "w+").unwrap();
        stream.write(b"persisted").unwrap();
        assert_eq!(stream.size(), Some(9));
        assert_eq!(stream.metadata_value("uri"), Some(serde_json::Value::from(path.display().to_string())));
        stream.close();

        let mut stream = ByteStream::open(&path, "rb").unwrap();
        assert!(!stream.is_writable());
        assert_eq!(&stream.contents().unwrap()[..], b"persisted");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_rebind_keeps_position() {
        let mut stream = ByteStream::from_bytes("abcdef");
        assert_eq!(&stream.read(4).unwrap()[..], b"abcd");

        let mut rebound = ByteStream::new(stream.detach().unwrap());
        assert_eq!(rebound.tell().unwrap(), 4);
        assert!(!rebound.eof());

        assert_eq!(&rebound.read(10).unwrap()[..], b"ef");
        assert_eq!(rebound.tell().unwrap(), 6);
        assert!(rebound.eof());
    }

    #[test]
    fn test_bind_file_opened_midway() {
        let path = std::env::temp_dir().join(format!("micro-message-rebind-{}.txt", std::process::id()));
        std::fs::write(&path, b"0123456789").unwrap();

        let mut file = std::fs::File::open(&path).unwrap();
        file.seek(SeekFrom::Start(7)).unwrap();
        let mut stream = ByteStream::new(Resource::from_file(file, "rb", Some(path.clone())).unwrap());

        assert_eq!(stream.tell().unwrap(), 7);
        assert_eq!(&stream.contents().unwrap()[..], b"789");
        assert!(stream.eof());

        std::fs::remove_file(&path).unwrap();
    }
}
