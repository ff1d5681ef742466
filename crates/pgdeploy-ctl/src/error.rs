//! # Design
//!
//! - Constant-message errors with the binary, operation and captured output as fields.
//! - A non-zero exit keeps the exit code and standard error for the caller to surface.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for process wrappers.
pub type CtlResult<T> = Result<T, CtlError>;

/// Errors produced while running `PostgreSQL` tools.
#[derive(Debug, Error)]
pub enum CtlError {
    /// The executable does not exist.
    #[error("binary not found")]
    BinaryNotFound {
        /// Expected location of the executable.
        binary: PathBuf,
    },
    /// The process could not be spawned.
    #[error("failed to spawn process")]
    Spawn {
        /// Human readable description of the invocation.
        description: String,
        /// Executable that failed to start.
        binary: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The process exited unsuccessfully.
    #[error("process exited unsuccessfully")]
    ProcessFailed {
        /// Human readable description of the invocation.
        description: String,
        /// Exit code, absent when terminated by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
}
