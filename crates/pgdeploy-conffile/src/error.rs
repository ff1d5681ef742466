//! # Design
//!
//! - Constant-message errors; the operation and path travel as fields.
//! - The merge engine itself is infallible, so only file access can fail here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration file operations.
pub type ConfFileResult<T> = Result<T, ConfFileError>;

/// Errors produced while reading or writing configuration files.
#[derive(Debug, Error)]
pub enum ConfFileError {
    /// IO failures while interacting with the filesystem.
    #[error("configuration file io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl ConfFileError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
