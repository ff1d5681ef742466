//! Unpacked `PostgreSQL` installations.

use std::fmt::{self, Debug, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pgdeploy_ctl::{ClusterCreationOptions, run_initdb};
use tracing::info;

use crate::cluster::Cluster;
use crate::error::{DeployError, DeployResult};
use crate::router::Router;
use crate::supplier::SharedCatalog;

/// Installation rooted at a directory holding `bin` and `lib`.
#[derive(Clone)]
pub struct Installation {
    path: PathBuf,
    router: Arc<dyn Router>,
    catalog: SharedCatalog,
}

impl Debug for Installation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Installation")
            .field("path", &self.path)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

impl Installation {
    /// Wrap the installation at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InstallationNotFound`] when `path` is not a directory.
    pub fn open(
        path: impl Into<PathBuf>,
        router: Arc<dyn Router>,
        catalog: SharedCatalog,
    ) -> DeployResult<Self> {
        let path = path.into();
        if !path.is_dir() {
            return Err(DeployError::InstallationNotFound { path });
        }
        Ok(Self {
            path,
            router,
            catalog,
        })
    }

    /// Installation root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path layout.
    #[must_use]
    pub fn router(&self) -> &Arc<dyn Router> {
        &self.router
    }

    /// Settings catalog for this release.
    #[must_use]
    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    /// `initdb` executable.
    #[must_use]
    pub fn initdb(&self) -> PathBuf {
        self.router.initdb(&self.path)
    }

    /// `pg_ctl` executable.
    #[must_use]
    pub fn pg_ctl(&self) -> PathBuf {
        self.router.pg_ctl(&self.path)
    }

    /// Initialise a new cluster in `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::ClusterDirectoryNotEmpty`] when `destination`
    /// already holds files, [`DeployError::Ctl`] when `initdb` fails and
    /// [`DeployError::BadCluster`] when the result lacks a configuration file.
    pub fn create_cluster(
        &self,
        destination: &Path,
        options: &ClusterCreationOptions,
    ) -> DeployResult<Cluster> {
        if destination.exists() {
            let mut entries = fs::read_dir(destination)
                .map_err(|source| DeployError::io("cluster.inspect", destination, source))?;
            if entries.next().is_some() {
                return Err(DeployError::ClusterDirectoryNotEmpty {
                    path: destination.to_path_buf(),
                });
            }
        }

        run_initdb(&self.initdb(), destination, options)
            .map_err(|source| DeployError::ctl("cluster.initdb", source))?;
        let cluster = self.open_cluster(destination)?;
        info!(
            installation = %self.path.display(),
            data_dir = %destination.display(),
            "cluster created"
        );
        Ok(cluster)
    }

    /// Attach to the existing cluster in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::ClusterNotFound`] when `data_dir` is not a
    /// directory and [`DeployError::BadCluster`] when a configuration file is missing.
    pub fn open_cluster(&self, data_dir: &Path) -> DeployResult<Cluster> {
        if !data_dir.is_dir() {
            return Err(DeployError::ClusterNotFound {
                path: data_dir.to_path_buf(),
            });
        }
        for required in [
            self.router.postgresql_conf(data_dir),
            self.router.pg_hba_conf(data_dir),
        ] {
            if !required.is_file() {
                return Err(DeployError::BadCluster { path: required });
            }
        }
        Ok(Cluster::new(self.clone(), data_dir.to_path_buf()))
    }
}
