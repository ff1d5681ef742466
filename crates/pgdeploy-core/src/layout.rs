//! Installation folders and completeness checks.
//!
//! # Design
//! - `bin` and `lib` are always installed; `share` and `include` are opt-in.
//! - A complete installation has every requested folder as a directory.
//! - Unrequested folders that are present are reported separately so callers
//!   can tell a dirty destination from a broken unpack.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

use serde::Serialize;

use crate::error::{DeployError, DeployResult};

/// Top-level folder of a binary distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallationFolder {
    /// Executables.
    Bin,
    /// Shared libraries.
    Lib,
    /// Architecture-independent support files.
    Share,
    /// C headers.
    Include,
}

impl InstallationFolder {
    /// Every folder, in distribution order.
    pub const ALL: [Self; 4] = [Self::Bin, Self::Lib, Self::Share, Self::Include];

    /// Directory name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::Lib => "lib",
            Self::Share => "share",
            Self::Include => "include",
        }
    }

    /// Folder called `name`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|folder| folder.name() == name)
    }
}

impl Display for InstallationFolder {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Which folders an installation should contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    share: bool,
    include: bool,
}

impl InstallOptions {
    /// Binaries and libraries only.
    #[must_use]
    pub const fn binaries() -> Self {
        Self {
            share: false,
            include: false,
        }
    }

    /// Also install `share`.
    #[must_use]
    pub const fn with_share(mut self) -> Self {
        self.share = true;
        self
    }

    /// Also install `include`.
    #[must_use]
    pub const fn with_include(mut self) -> Self {
        self.include = true;
        self
    }

    /// Requested folders.
    #[must_use]
    pub fn folders(&self) -> Vec<InstallationFolder> {
        let mut folders = vec![InstallationFolder::Bin, InstallationFolder::Lib];
        if self.share {
            folders.push(InstallationFolder::Share);
        }
        if self.include {
            folders.push(InstallationFolder::Include);
        }
        folders
    }
}

/// Verify that every folder in `folders` exists under `destination` as a directory.
///
/// # Errors
///
/// Returns [`DeployError::BadInstallation`] listing missing folders and
/// non-directory paths.
pub fn check_installation_complete(
    destination: &Path,
    folders: &[InstallationFolder],
) -> DeployResult<()> {
    let mut missing = Vec::new();
    let mut not_directories = Vec::new();
    for folder in folders {
        let path = destination.join(folder.name());
        if !path.exists() {
            missing.push(path);
        } else if !path.is_dir() {
            not_directories.push(path);
        }
    }
    if missing.is_empty() && not_directories.is_empty() {
        Ok(())
    } else {
        Err(DeployError::BadInstallation {
            missing,
            not_directories,
        })
    }
}

/// Verify that no folder outside `folders` exists under `destination`.
///
/// # Errors
///
/// Returns [`DeployError::ExtraFolders`] naming requested and unexpected folders.
pub fn check_installation_extra_folders(
    destination: &Path,
    folders: &[InstallationFolder],
) -> DeployResult<()> {
    let found: Vec<String> = InstallationFolder::ALL
        .into_iter()
        .filter(|folder| !folders.contains(folder))
        .filter(|folder| destination.join(folder.name()).exists())
        .map(|folder| folder.name().to_string())
        .collect();
    if found.is_empty() {
        return Ok(());
    }
    Err(DeployError::ExtraFolders {
        requested: folders.iter().map(|folder| folder.name().to_string()).collect(),
        found,
    })
}
