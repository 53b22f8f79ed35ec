//! Error types for vuefs filesystem hosts.

use thiserror::Error;

/// Errors raised by filesystem hosts and the Vue adapter.
#[derive(Error, Debug)]
pub enum FsError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    /// Write to a virtual path whose component has neither `<script setup>`
    /// nor `<script>`.
    #[error("Cannot write to Vue file: No script block found in {0}")]
    MissingScriptBlock(String),

    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for filesystem host operations.
pub type FsResult<T> = Result<T, FsError>;

impl FsError {
    /// Map an I/O error on `path` to a file-level error.
    pub(crate) fn from_io_file(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::FileNotFound(path.to_string()),
            std::io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path.to_string()),
            std::io::ErrorKind::InvalidData => FsError::InvalidUtf8(path.to_string()),
            _ => FsError::Io(err),
        }
    }

    /// Map an I/O error on `path` to a directory-level error.
    pub(crate) fn from_io_dir(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::DirectoryNotFound(path.to_string()),
            _ => FsError::Io(err),
        }
    }
}
