//! Uploaded files.
//!
//! An [`UploadedFile`] wraps either the temporary path the server stored the
//! upload at or a stream holding its bytes. It can be moved to its final
//! location exactly once; uploads that failed client side never expose a
//! stream.
//!
//! [`normalize_files`] turns the raw, possibly nested upload specification
//! (`tmp_name`, `size`, `error`, `name`, `type` per field) into an
//! [`UploadedFiles`] tree.

mod error_code;
mod normalize;
mod uploaded_file;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use error_code::UploadErrorCode;
pub use normalize::normalize_files;
pub use uploaded_file::UploadSource;
pub use uploaded_file::UploadedFile;

/// Uploaded files by field name.
pub type UploadedFiles = BTreeMap<String, UploadedFileTree>;

/// A leaf upload or a nested group, mirroring multi-dimensional field names
/// such as `docs[a][]`.
#[derive(Debug, Clone)]
pub enum UploadedFileTree {
    File(Arc<UploadedFile>),
    Nested(UploadedFiles),
}

impl UploadedFileTree {
    pub fn as_file(&self) -> Option<&Arc<UploadedFile>> {
        match self {
            UploadedFileTree::File(file) => Some(file),
            UploadedFileTree::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&UploadedFiles> {
        match self {
            UploadedFileTree::File(_) => None,
            UploadedFileTree::Nested(files) => Some(files),
        }
    }

    /// Follows `path` through nested groups, e.g. `["docs", "0"]`.
    pub fn get(&self, path: &[&str]) -> Option<&UploadedFileTree> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.as_nested()?.get(*head)?.get(rest),
        }
    }
}

impl From<UploadedFile> for UploadedFileTree {
    fn from(file: UploadedFile) -> Self {
        UploadedFileTree::File(Arc::new(file))
    }
}
