//! Byte streams over an exclusively owned resource.
//!
//! A [`Resource`] is an open, byte-addressable channel: an in-memory buffer, a
//! file, or any [`std::io::Read`] source. A [`ByteStream`] owns exactly one
//! resource and exposes read/write/seek according to the capabilities fixed
//! when it was bound, caching the resource size until the next write.
//!
//! Messages share their body through a [`SharedStream`], a cloneable handle
//! that compares by identity.
//!
//! # Example
//!
//! ```
//! use micro_message::stream::ByteStream;
//!
//! let mut source = ByteStream::from_bytes(b"hello world");
//! let mut dest = ByteStream::empty();
//!
//! let copied = source.copy_to(&mut dest, Some(5)).unwrap();
//! assert_eq!(copied, 5);
//!
//! dest.rewind().unwrap();
//! assert_eq!(&dest.contents().unwrap()[..], b"hello");
//! ```

mod byte_stream;
mod mode;
mod resource;
mod shared;

pub use byte_stream::ByteStream;
pub use byte_stream::StreamMetadata;
pub use byte_stream::COPY_CHUNK_SIZE;
pub use mode::OpenMode;
pub use resource::Resource;
pub use shared::SharedStream;
