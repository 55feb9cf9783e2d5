use std::io;
use thiserror::Error;

/// Top-level error for operations that can fail in more than one way.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("validation error: {source}")]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("stream error: {source}")]
    Stream {
        #[from]
        source: StreamError,
    },
}

/// Malformed URI input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unable to parse uri: {uri}")]
    InvalidUri { uri: String },

    #[error("invalid port: {port}, must be between 1 and 65535")]
    InvalidPort { port: String },
}

impl ParseError {
    pub fn invalid_uri<S: ToString>(uri: S) -> Self {
        Self::InvalidUri { uri: uri.to_string() }
    }

    pub fn invalid_port<S: ToString>(port: S) -> Self {
        Self::InvalidPort { port: port.to_string() }
    }
}

/// Input rejected before it could become part of a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid header name: {name}")]
    InvalidHeaderName { name: String },

    #[error("invalid value for header {name}: {value:?}")]
    InvalidHeaderValue { name: String, value: String },

    #[error("invalid http method: {method}")]
    InvalidMethod { method: String },

    #[error("invalid status code: {code}")]
    InvalidStatus { code: u16 },

    #[error("invalid request target {target:?}, cannot contain whitespace")]
    InvalidRequestTarget { target: String },

    #[error("invalid error status for uploaded file: {code}")]
    InvalidUploadError { code: i64 },

    #[error("invalid path provided for move operation, must be a non-empty path")]
    EmptyTargetPath,

    #[error("cannot determine http method, {key} is missing")]
    MissingMethod { key: &'static str },

    #[error("invalid file specification: {reason}")]
    InvalidFileSpec { reason: String },
}

impl ValidationError {
    pub fn invalid_header_name<S: ToString>(name: S) -> Self {
        Self::InvalidHeaderName { name: name.to_string() }
    }

    pub fn invalid_header_value<N: ToString, V: ToString>(name: N, value: V) -> Self {
        Self::InvalidHeaderValue { name: name.to_string(), value: value.to_string() }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn invalid_file_spec<S: ToString>(reason: S) -> Self {
        Self::InvalidFileSpec { reason: reason.to_string() }
    }
}

/// Resource level failures of a [`ByteStream`](crate::stream::ByteStream) or an upload.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("stream is detached")]
    Detached,

    #[error("cannot read from non-readable stream")]
    NotReadable,

    #[error("cannot write to a non-writable stream")]
    NotWritable,

    #[error("stream is not seekable")]
    NotSeekable,

    #[error("length parameter must be greater than zero")]
    ZeroLengthRead,

    #[error("cannot copy a stream into itself")]
    SelfCopy,

    #[error("invalid open mode: {mode:?}")]
    InvalidMode { mode: String },

    #[error("cannot retrieve stream due to upload error: {reason}")]
    UploadFailed { reason: &'static str },

    #[error("cannot retrieve stream after it has already been moved")]
    AlreadyMoved,

    #[error("uploaded file could not be moved to {target}: {source}")]
    MoveFailed {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl StreamError {
    pub fn invalid_mode<S: ToString>(mode: S) -> Self {
        Self::InvalidMode { mode: mode.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
