//! Sources of `PostgreSQL` binary distributions.
//!
//! # Design
//! - A supplier describes the release it ships ([`SupplierFeatures`]) and knows
//!   how to unpack selected top-level folders into a destination.
//! - [`ZipSupplier`] reads a zip package whose top-level folders are `bin`,
//!   `lib`, `share` and `include`; entries outside requested folders are skipped.

use std::fmt::Debug;
use std::fs::{self, File};
use std::io;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use pgdeploy_config::{PropertyCatalog, TableCatalog};
use serde::Serialize;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{DeployError, DeployResult};
use crate::layout::{
    InstallationFolder, check_installation_complete, check_installation_extra_folders,
};
use crate::router::{DefaultRouter, Router};
use crate::version::{Platform, PostgresMajorVersion};

/// Shared, thread-safe property catalog handle.
pub type SharedCatalog = Arc<dyn PropertyCatalog + Send + Sync>;

/// Release identity of a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SupplierFeatures {
    major: PostgresMajorVersion,
    minor: u32,
    platform: Platform,
    extra_version: Option<String>,
}

impl SupplierFeatures {
    /// Release `major.minor` built for `platform`.
    #[must_use]
    pub const fn new(major: PostgresMajorVersion, minor: u32, platform: Platform) -> Self {
        Self {
            major,
            minor,
            platform,
            extra_version: None,
        }
    }

    /// Tag a build variant (`-1`, `beta2`, ...).
    #[must_use]
    pub fn with_extra_version(mut self, extra: impl Into<String>) -> Self {
        self.extra_version = Some(extra.into());
        self
    }

    /// Major version.
    #[must_use]
    pub const fn major(&self) -> PostgresMajorVersion {
        self.major
    }

    /// Minor version.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Target platform.
    #[must_use]
    pub const fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Build variant, if any.
    #[must_use]
    pub fn extra_version(&self) -> Option<&str> {
        self.extra_version.as_deref()
    }

    /// Whether a supplier offering `self` satisfies `requested`.
    ///
    /// The build variant is only compared when `requested` names one.
    #[must_use]
    pub fn satisfies(&self, requested: &Self) -> bool {
        self.major == requested.major
            && self.minor == requested.minor
            && self.platform == requested.platform
            && requested
                .extra_version
                .as_ref()
                .is_none_or(|extra| self.extra_version.as_ref() == Some(extra))
    }

    /// Conventional package file name, e.g. `postgresql-9.6.2-linux_x86_64.zip`.
    #[must_use]
    pub fn package_file_name(&self) -> String {
        let extra = self
            .extra_version
            .as_ref()
            .map(|extra| format!("-{extra}"))
            .unwrap_or_default();
        format!(
            "postgresql-{}.{}{extra}-{}.zip",
            self.major,
            self.minor,
            self.platform.to_file_string()
        )
    }
}

/// Provider of a binary distribution.
pub trait InstallationSupplier: Debug + Send + Sync {
    /// Release shipped by this supplier.
    fn features(&self) -> &SupplierFeatures;

    /// Extract `folders` into `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error when the package cannot be read or the destination written.
    fn unpack_folders(&self, destination: &Path, folders: &[InstallationFolder])
    -> DeployResult<()>;

    /// Whether this supplier satisfies `requested`.
    fn accepts(&self, requested: &SupplierFeatures) -> bool {
        self.features().satisfies(requested)
    }

    /// Verify an unpacked installation.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::BadInstallation`] or [`DeployError::ExtraFolders`].
    fn check_installation(
        &self,
        destination: &Path,
        folders: &[InstallationFolder],
    ) -> DeployResult<()> {
        check_installation_complete(destination, folders)?;
        check_installation_extra_folders(destination, folders)
    }

    /// Path layout of installations produced by this supplier.
    fn router(&self) -> Arc<dyn Router> {
        Arc::new(DefaultRouter)
    }

    /// Settings catalog matching this release.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Catalog`] when the catalog cannot be loaded.
    fn catalog(&self) -> DeployResult<SharedCatalog> {
        let catalog =
            TableCatalog::bundled().map_err(|source| DeployError::Catalog { source })?;
        Ok(Arc::new(catalog))
    }
}

/// Supplier backed by a zip package on disk.
#[derive(Debug, Clone)]
pub struct ZipSupplier {
    features: SupplierFeatures,
    package: PathBuf,
}

impl ZipSupplier {
    /// Supplier for the package at `package`.
    #[must_use]
    pub fn new(features: SupplierFeatures, package: impl Into<PathBuf>) -> Self {
        Self {
            features,
            package: package.into(),
        }
    }

    /// Supplier for `<directory>/<conventional package name>`.
    #[must_use]
    pub fn in_directory(features: SupplierFeatures, directory: &Path) -> Self {
        let package = directory.join(features.package_file_name());
        Self::new(features, package)
    }

    /// Package location.
    #[must_use]
    pub fn package(&self) -> &Path {
        &self.package
    }
}

impl InstallationSupplier for ZipSupplier {
    fn features(&self) -> &SupplierFeatures {
        &self.features
    }

    fn unpack_folders(
        &self,
        destination: &Path,
        folders: &[InstallationFolder],
    ) -> DeployResult<()> {
        if !self.package.is_file() {
            return Err(DeployError::UnreachablePackage {
                path: self.package.clone(),
            });
        }
        let file = File::open(&self.package)
            .map_err(|source| DeployError::io("unpack.open", &self.package, source))?;
        let mut archive = ZipArchive::new(file)
            .map_err(|source| DeployError::zip("unpack.decode", &self.package, source))?;

        let mut extracted = 0_usize;
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|source| DeployError::zip("unpack.read_entry", &self.package, source))?;
            let entry_path = sanitize_entry(entry.name())?;
            let Some(top) = top_level_folder(&entry_path) else {
                debug!(entry = entry.name(), "skipping archive entry outside installation folders");
                continue;
            };
            if !folders.contains(&top) {
                continue;
            }

            let target = destination.join(&entry_path);
            if entry.is_dir() {
                fs::create_dir_all(&target)
                    .map_err(|source| DeployError::io("unpack.create_dir", &target, source))?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|source| DeployError::io("unpack.create_parent", parent, source))?;
            }
            let mut output = File::create(&target)
                .map_err(|source| DeployError::io("unpack.create_file", &target, source))?;
            io::copy(&mut entry, &mut output)
                .map_err(|source| DeployError::io("unpack.copy", &target, source))?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&target, fs::Permissions::from_mode(mode))
                    .map_err(|source| DeployError::io("unpack.set_permissions", &target, source))?;
            }
            extracted += 1;
        }

        info!(
            package = %self.package.display(),
            destination = %destination.display(),
            files = extracted,
            "unpacked installation folders"
        );
        Ok(())
    }
}

fn sanitize_entry(entry: &str) -> DeployResult<PathBuf> {
    let invalid = || DeployError::InvalidArchiveEntry {
        entry: entry.to_string(),
    };
    let mut sanitized = PathBuf::new();
    for component in Path::new(entry).components() {
        match component {
            Component::Normal(segment) => sanitized.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid());
            }
        }
    }
    if sanitized.as_os_str().is_empty() {
        return Err(invalid());
    }
    Ok(sanitized)
}

fn top_level_folder(path: &Path) -> Option<InstallationFolder> {
    path.components()
        .next()
        .and_then(|component| component.as_os_str().to_str())
        .and_then(InstallationFolder::from_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> SupplierFeatures {
        SupplierFeatures::new(
            PostgresMajorVersion::Pre10(9, 6),
            2,
            Platform::new("linux", "x86_64"),
        )
    }

    #[test]
    fn extra_version_only_matters_when_requested() {
        let offered = features().with_extra_version("1");
        assert!(offered.satisfies(&features()));
        assert!(offered.satisfies(&features().with_extra_version("1")));
        assert!(!offered.satisfies(&features().with_extra_version("2")));
        assert!(!features().satisfies(&features().with_extra_version("1")));
        let other_minor = SupplierFeatures::new(
            PostgresMajorVersion::Pre10(9, 6),
            3,
            Platform::new("linux", "x86_64"),
        );
        assert!(!offered.satisfies(&other_minor));
    }

    #[test]
    fn package_names_follow_release() {
        assert_eq!(
            features().package_file_name(),
            "postgresql-9.6.2-linux_x86_64.zip"
        );
        assert_eq!(
            features().with_extra_version("1").package_file_name(),
            "postgresql-9.6.2-1-linux_x86_64.zip"
        );
        let supplier = ZipSupplier::in_directory(features(), Path::new("/pkgs"));
        assert_eq!(
            supplier.package(),
            Path::new("/pkgs/postgresql-9.6.2-linux_x86_64.zip")
        );
    }

    #[test]
    fn entries_cannot_escape_destination() {
        assert!(sanitize_entry("../etc/passwd").is_err());
        assert!(sanitize_entry("/bin/sh").is_err());
        assert_eq!(
            sanitize_entry("./bin/pg_ctl").expect("relative entry"),
            PathBuf::from("bin/pg_ctl")
        );
        assert_eq!(
            top_level_folder(Path::new("lib/libpq.so")),
            Some(InstallationFolder::Lib)
        );
        assert_eq!(top_level_folder(Path::new("doc/README")), None);
    }

    #[test]
    fn missing_package_is_unreachable() {
        let supplier = ZipSupplier::new(features(), "/definitely/missing.zip");
        let err = supplier
            .unpack_folders(Path::new("/tmp/unused"), &[InstallationFolder::Bin])
            .expect_err("missing package");
        assert!(matches!(err, DeployError::UnreachablePackage { .. }));
    }
}
