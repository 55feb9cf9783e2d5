use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::{MessageError, StreamError, ValidationError};
use crate::stream::{ByteStream, SharedStream};

use super::UploadErrorCode;

/// Where the bytes of an upload live.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Temporary file written by the server.
    Path(PathBuf),
    Stream(SharedStream),
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        UploadSource::Path(path)
    }
}

impl From<&Path> for UploadSource {
    fn from(path: &Path) -> Self {
        UploadSource::Path(path.to_path_buf())
    }
}

impl From<SharedStream> for UploadSource {
    fn from(stream: SharedStream) -> Self {
        UploadSource::Stream(stream)
    }
}

impl From<ByteStream> for UploadSource {
    fn from(stream: ByteStream) -> Self {
        UploadSource::Stream(SharedStream::new(stream))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Moved,
}

/// A file received with a request.
///
/// Client supplied name and media type are advisory and must not be trusted.
#[derive(Debug)]
pub struct UploadedFile {
    error: UploadErrorCode,
    size: u64,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    source: Option<UploadSource>,
    state: Mutex<State>,
}

impl UploadedFile {
    /// Creates an upload. When `error` is not [`UploadErrorCode::Ok`] the source is dropped.
    pub fn new(
        source: impl Into<UploadSource>,
        size: u64,
        error: UploadErrorCode,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Self {
        let source = if error.is_ok() { Some(source.into()) } else { None };

        Self { error, size, client_filename, client_media_type, source, state: Mutex::new(State::Pending) }
    }

    /// Like [`UploadedFile::new`], with the numeric error code as sent by the server.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUploadError`] for an unknown code.
    pub fn from_raw_code(
        source: impl Into<UploadSource>,
        size: u64,
        error: i64,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Result<Self, ValidationError> {
        let error = UploadErrorCode::try_from(error)?;
        Ok(Self::new(source, size, error, client_filename, client_media_type))
    }

    pub fn error(&self) -> UploadErrorCode {
        self.error
    }

    /// The size declared at upload time.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    pub fn is_moved(&self) -> bool {
        *self.lock_state() == State::Moved
    }

    /// Returns a stream over the uploaded bytes, opening the temporary file read-only if needed.
    ///
    /// # Errors
    ///
    /// Fails if the upload errored, was already moved, or the file cannot be opened.
    pub fn stream(&self) -> Result<SharedStream, StreamError> {
        let state = self.lock_state();
        self.ensure_active(*state)?;

        match self.source.as_ref() {
            Some(UploadSource::Stream(stream)) => Ok(stream.clone()),
            Some(UploadSource::Path(path)) => ByteStream::open(path, "rb").map(SharedStream::new),
            None => Err(StreamError::UploadFailed { reason: self.error.description() }),
        }
    }

    /// Moves the upload to `target`. Afterwards the upload can neither be moved
    /// again nor streamed.
    ///
    /// A file backed upload is renamed; a stream backed upload is rewound when
    /// possible and copied into a newly created file.
    ///
    /// # Errors
    ///
    /// Fails with a [`StreamError`] if the upload is not active or the move fails,
    /// and with [`ValidationError::EmptyTargetPath`] for an empty `target`.
    pub fn move_to(&self, target: impl AsRef<Path>) -> Result<(), MessageError> {
        let target = target.as_ref();
        let mut state = self.lock_state();
        self.ensure_active(*state)?;

        if target.as_os_str().is_empty() {
            return Err(ValidationError::EmptyTargetPath.into());
        }

        let move_failed = |source: io::Error| StreamError::MoveFailed { target: target.display().to_string(), source };

        match self.source.as_ref() {
            Some(UploadSource::Path(path)) => {
                std::fs::rename(path, target).map_err(move_failed)?;
            }
            Some(UploadSource::Stream(stream)) => {
                let mut source = stream.lock();
                if source.is_seekable() {
                    source.rewind()?;
                }

                let mut dest = ByteStream::open(target, "wb").map_err(|e| match e {
                    StreamError::Io { source } => move_failed(source),
                    other => other,
                })?;
                source.copy_to(&mut dest, None)?;
                dest.close();
            }
            None => return Err(StreamError::UploadFailed { reason: self.error.description() }.into()),
        }

        *state = State::Moved;
        debug!(path = %target.display(), filename = ?self.client_filename, "uploaded file moved");
        Ok(())
    }

    fn ensure_active(&self, state: State) -> Result<(), StreamError> {
        if !self.error.is_ok() {
            return Err(StreamError::UploadFailed { reason: self.error.description() });
        }

        if state == State::Moved {
            return Err(StreamError::AlreadyMoved);
        }

        Ok(())
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
