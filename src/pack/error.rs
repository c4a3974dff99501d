#![forbid(unsafe_code)]

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::result::ZipError;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("need at least 3 arguments: <asset>... <binary> <output>")]
    Usage,

    #[error("{}: no such file or directory", .0.display())]
    NotFound(PathBuf),

    #[error("{}: permission denied", .0.display())]
    PermissionDenied(PathBuf),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("short copy of binary: copied {copied} of {expected} bytes")]
    ShortCopy { expected: u64, copied: u64 },

    #[error("cannot create entry {name:?}: {reason}")]
    Entry { name: String, reason: String },

    #[error("invalid: {0}")]
    Invalid(String),
}

impl PackError {
    /// Attach `path` to open/stat failures so the user sees which input broke.
    pub fn at(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => PackError::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => PackError::PermissionDenied(path.to_path_buf()),
            _ => PackError::Io(err),
        }
    }

    pub(crate) fn entry(name: &str, reason: impl Into<String>) -> Self {
        PackError::Entry {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ZipError> for PackError {
    fn from(err: ZipError) -> Self {
        match err {
            ZipError::Io(e) => PackError::Io(e),
            other => PackError::Invalid(other.to_string()),
        }
    }
}

pub type PackResult<T> = Result<T, PackError>;
