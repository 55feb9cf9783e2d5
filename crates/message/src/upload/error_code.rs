use std::fmt;

use crate::error::ValidationError;

/// Outcome of an upload as reported by the server, with the conventional numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadErrorCode {
    Ok = 0,
    IniSize = 1,
    FormSize = 2,
    Partial = 3,
    NoFile = 4,
    NoTmpDir = 6,
    CantWrite = 7,
    Extension = 8,
}

impl UploadErrorCode {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn is_ok(self) -> bool {
        self == UploadErrorCode::Ok
    }

    pub fn description(self) -> &'static str {
        match self {
            UploadErrorCode::Ok => "no error",
            UploadErrorCode::IniSize => "file exceeds the server size limit",
            UploadErrorCode::FormSize => "file exceeds the form size limit",
            UploadErrorCode::Partial => "file was only partially uploaded",
            UploadErrorCode::NoFile => "no file was uploaded",
            UploadErrorCode::NoTmpDir => "missing a temporary folder",
            UploadErrorCode::CantWrite => "failed to write file to disk",
            UploadErrorCode::Extension => "an extension stopped the upload",
        }
    }
}

impl TryFrom<i64> for UploadErrorCode {
    type Error = ValidationError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(UploadErrorCode::Ok),
            1 => Ok(UploadErrorCode::IniSize),
            2 => Ok(UploadErrorCode::FormSize),
            3 => Ok(UploadErrorCode::Partial),
            4 => Ok(UploadErrorCode::NoFile),
            6 => Ok(UploadErrorCode::NoTmpDir),
            7 => Ok(UploadErrorCode::CantWrite),
            8 => Ok(UploadErrorCode::Extension),
            code => Err(ValidationError::InvalidUploadError { code }),
        }
    }
}

impl fmt::Display for UploadErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}
