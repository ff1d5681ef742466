//! # Design
//!
//! - Constant-message errors; paths, folder lists and inputs travel as fields.
//! - Failures from the config, conffile and ctl layers are wrapped with the
//!   operation that triggered them and kept as `source`.

use std::io;
use std::path::PathBuf;

use pgdeploy_conffile::ConfFileError;
use pgdeploy_config::ConfigError;
use pgdeploy_ctl::CtlError;
use thiserror::Error;

/// Result type for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors produced while installing binaries and managing clusters.
#[derive(Debug, Error)]
pub enum DeployError {
    /// IO failures while interacting with the filesystem.
    #[error("deploy io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Zip package could not be read.
    #[error("package archive failure")]
    Zip {
        /// Operation that triggered the archive failure.
        operation: &'static str,
        /// Package involved in the failure.
        path: PathBuf,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },
    /// A `PostgreSQL` tool failed.
    #[error("postgres tool failure")]
    Ctl {
        /// Operation that triggered the tool invocation.
        operation: &'static str,
        /// Underlying process error.
        source: CtlError,
    },
    /// Configuration file could not be updated.
    #[error("configuration file failure")]
    ConfFile {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Underlying file error.
        source: ConfFileError,
    },
    /// Property catalog could not be loaded.
    #[error("property catalog failure")]
    Catalog {
        /// Underlying catalog error.
        source: ConfigError,
    },
    /// Version text is not `N` or `N.M`.
    #[error("invalid postgres major version")]
    InvalidVersion {
        /// Offending input.
        value: String,
    },
    /// Platform text is not `os_arch`.
    #[error("invalid platform")]
    InvalidPlatform {
        /// Offending input.
        value: String,
    },
    /// Package file is missing.
    #[error("installation package unreachable")]
    UnreachablePackage {
        /// Expected package location.
        path: PathBuf,
    },
    /// Archive entry escapes the destination.
    #[error("invalid archive entry")]
    InvalidArchiveEntry {
        /// Offending entry name.
        entry: String,
    },
    /// Requested installation folders are missing or are not directories.
    #[error("installation is incomplete")]
    BadInstallation {
        /// Folders that do not exist.
        missing: Vec<PathBuf>,
        /// Paths that exist but are not directories.
        not_directories: Vec<PathBuf>,
    },
    /// Installation contains folders that were not requested.
    #[error("installation contains unexpected folders")]
    ExtraFolders {
        /// Folders that were requested.
        requested: Vec<String>,
        /// Unrequested folders found.
        found: Vec<String>,
    },
    /// Installation directory does not exist.
    #[error("installation directory not found")]
    InstallationNotFound {
        /// Missing directory.
        path: PathBuf,
    },
    /// Cluster directory does not exist.
    #[error("cluster directory not found")]
    ClusterNotFound {
        /// Missing directory.
        path: PathBuf,
    },
    /// Cluster destination already holds files.
    #[error("cluster directory is not empty")]
    ClusterDirectoryNotEmpty {
        /// Non-empty destination.
        path: PathBuf,
    },
    /// A required cluster file is missing.
    #[error("cluster is missing a required file")]
    BadCluster {
        /// Missing file.
        path: PathBuf,
    },
}

impl DeployError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: zip::result::ZipError,
    ) -> Self {
        Self::Zip {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) const fn ctl(operation: &'static str, source: CtlError) -> Self {
        Self::Ctl { operation, source }
    }

    pub(crate) const fn conffile(operation: &'static str, source: ConfFileError) -> Self {
        Self::ConfFile { operation, source }
    }
}
