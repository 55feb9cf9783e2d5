use std::fs::OpenOptions;

use crate::error::StreamError;

/// Modes, as `fopen` spells them, that allow reading.
const READABLE_MODES: &[&str] = &[
    "r", "w+", "r+", "x+", "c+", "rb", "w+b", "r+b", "x+b", "c+b", "rt", "w+t", "r+t", "x+t", "c+t", "a+", "a+b",
    "a+t",
];

/// Modes, as `fopen` spells them, that allow writing.
const WRITABLE_MODES: &[&str] = &[
    "w", "w+", "rw", "r+", "x+", "c+", "wb", "w+b", "r+b", "x+b", "c+b", "w+t", "r+t", "x+t", "c+t", "a", "a+",
    "ab", "a+b", "at", "a+t", "x", "xb", "xt", "c", "cb", "ct",
];

/// The open mode of a resource, classified once through fixed lookup tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMode {
    mode: String,
    readable: bool,
    writable: bool,
}

impl OpenMode {
    /// Classifies an `fopen` style mode string such as `"rb"` or `"w+"`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidMode`] when the mode is neither readable nor writable.
    pub fn parse(mode: &str) -> Result<Self, StreamError> {
        let readable = READABLE_MODES.contains(&mode);
        let writable = WRITABLE_MODES.contains(&mode);

        if !readable && !writable {
            return Err(StreamError::invalid_mode(mode));
        }

        Ok(Self { mode: mode.to_string(), readable, writable })
    }

    pub(crate) fn read_only() -> Self {
        Self { mode: "rb".into(), readable: true, writable: false }
    }

    pub(crate) fn read_write() -> Self {
        Self { mode: "w+b".into(), readable: true, writable: true }
    }

    pub fn as_str(&self) -> &str {
        &self.mode
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Translates the mode into [`OpenOptions`] for opening a file.
    pub(crate) fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(self.readable).write(self.writable);

        match self.mode.as_bytes().first() {
            Some(b'w') => {
                options.create(true).truncate(true);
            }
            Some(b'a') => {
                options.append(true).create(true);
            }
            Some(b'x') => {
                options.create_new(true);
            }
            Some(b'c') => {
                options.create(true);
            }
            _ => {}
        }

        options
    }
}
