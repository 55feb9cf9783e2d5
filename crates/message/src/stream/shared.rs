use std::fmt;
use std::io::SeekFrom;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tracing::warn;

use crate::ensure;
use crate::error::StreamError;

use super::{ByteStream, StreamMetadata};

/// A cloneable handle to one [`ByteStream`].
///
/// Clones refer to the same stream: reading through one advances the position
/// seen by all of them. Two handles are "the same body" when [`ptr_eq`](Self::ptr_eq)
/// holds.
#[derive(Clone)]
pub struct SharedStream {
    inner: Arc<Mutex<ByteStream>>,
}

impl SharedStream {
    pub fn new(stream: ByteStream) -> Self {
        Self { inner: Arc::new(Mutex::new(stream)) }
    }

    /// Materializes `data` into a fresh in-memory stream.
    pub fn from_bytes(data: impl AsRef<[u8]>) -> Self {
        Self::new(ByteStream::from_bytes(data))
    }

    pub fn empty() -> Self {
        Self::new(ByteStream::empty())
    }

    /// Locks the stream for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, ByteStream> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if both handles refer to the same stream.
    pub fn ptr_eq(&self, other: &SharedStream) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_readable(&self) -> bool {
        self.lock().is_readable()
    }

    pub fn is_writable(&self) -> bool {
        self.lock().is_writable()
    }

    pub fn is_seekable(&self) -> bool {
        self.lock().is_seekable()
    }

    pub fn size(&self) -> Option<u64> {
        self.lock().size()
    }

    pub fn tell(&self) -> Result<u64, StreamError> {
        self.lock().tell()
    }

    pub fn eof(&self) -> bool {
        self.lock().eof()
    }

    pub fn seek(&self, pos: SeekFrom) -> Result<u64, StreamError> {
        self.lock().seek(pos)
    }

    pub fn rewind(&self) -> Result<(), StreamError> {
        self.lock().rewind()
    }

    pub fn read(&self, len: usize) -> Result<Bytes, StreamError> {
        self.lock().read(len)
    }

    pub fn contents(&self) -> Result<Bytes, StreamError> {
        self.lock().contents()
    }

    pub fn write(&self, data: &[u8]) -> Result<usize, StreamError> {
        self.lock().write(data)
    }

    pub fn metadata(&self) -> Option<StreamMetadata> {
        self.lock().metadata()
    }

    pub fn metadata_value(&self, key: &str) -> Option<serde_json::Value> {
        self.lock().metadata_value(key)
    }

    pub fn close(&self) {
        self.lock().close();
    }

    pub fn detach(&self) -> Option<super::Resource> {
        self.lock().detach()
    }

    /// Copies into `dest`, see [`ByteStream::copy_to`].
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SelfCopy`] when both handles refer to the same stream.
    pub fn copy_to(&self, dest: &SharedStream, max_len: Option<u64>) -> Result<u64, StreamError> {
        ensure!(!self.ptr_eq(dest), StreamError::SelfCopy);

        // locks are always taken in address order
        let (mut source, mut dest) = if Arc::as_ptr(&self.inner) < Arc::as_ptr(&dest.inner) {
            let source = self.lock();
            (source, dest.lock())
        } else {
            let dest = dest.lock();
            (self.lock(), dest)
        };
        source.copy_to(&mut dest, max_len)
    }

    fn read_all(&self) -> Result<Bytes, StreamError> {
        let mut stream = self.lock();
        stream.rewind()?;
        stream.contents()
    }
}

/// Rewinds and renders the whole stream. Any failure renders as an empty string.
impl fmt::Display for SharedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.read_all() {
            Ok(bytes) => f.write_str(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                warn!(cause = %e, "failed to render stream, rendering it empty");
                Ok(())
            }
        }
    }
}

impl fmt::Debug for SharedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Ok(stream) => f.debug_tuple("SharedStream").field(&*stream).finish(),
            Err(_) => f.write_str("SharedStream(<locked>)"),
        }
    }
}

impl From<ByteStream> for SharedStream {
    fn from(stream: ByteStream) -> Self {
        Self::new(stream)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::io::Read;

    use super::*;

    #[test]
    fn test_clones_share_position() {
        let stream = SharedStream::from_bytes("abcdef");
        let other = stream.clone();

        assert!(stream.ptr_eq(&other));
        assert_eq!(&stream.read(2).unwrap()[..], b"ab");
        assert_eq!(&other.read(2).unwrap()[..], b"cd");
        assert!(!stream.ptr_eq(&SharedStream::from_bytes("abcdef")));
    }

    #[test]
    fn test_display_rewinds() {
        let stream = SharedStream::from_bytes("hello");
        stream.read(3).unwrap();

        assert_eq!(stream.to_string(), "hello");
        assert_eq!(stream.to_string(), "hello");
    }

    #[test]
    fn test_display_swallows_errors() {
        let stream = SharedStream::new(ByteStream::from_reader(io::repeat(b'x').take(8)));
        assert_eq!(stream.to_string(), "");

        let stream = SharedStream::from_bytes("gone");
        stream.close();
        assert_eq!(stream.to_string(), "");
    }

    #[test]
    fn test_copy_between_handles() {
        let source = SharedStream::from_bytes(vec![1u8; 100]);
        let dest = SharedStream::empty();

        assert_eq!(source.copy_to(&dest, Some(10)).unwrap(), 10);
        assert_eq!(dest.size(), Some(10));
        assert!(matches!(source.copy_to(&source.clone(), None), Err(StreamError::SelfCopy)));
    }

    #[test]
    fn test_opposite_copies_do_not_deadlock() {
        let a = SharedStream::from_bytes([1u8; 64]);
        let b = SharedStream::from_bytes([2u8; 64]);

        std::thread::scope(|scope| {
            for (source, dest) in [(&a, &b), (&b, &a)] {
                scope.spawn(move || {
                    for _ in 0..500 {
                        source.rewind().unwrap();
                        source.copy_to(dest, Some(8)).unwrap();
                    }
                });
            }
        });

        assert!(a.size().unwrap() >= 64);
        assert!(b.size().unwrap() >= 64);
    }
}
