//! Entry point tying suppliers, installations and clusters together.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use pgdeploy_config::TableCatalog;
use tracing::{debug, info};

use crate::cluster::Cluster;
use crate::error::{DeployError, DeployResult};
use crate::installation::Installation;
use crate::layout::InstallOptions;
use crate::router::{DefaultRouter, Router};
use crate::supplier::{InstallationSupplier, SharedCatalog, SupplierFeatures};

/// Registry of suppliers plus the defaults used for existing installations.
#[derive(Debug, Default)]
pub struct PgDeploy {
    suppliers: Vec<Arc<dyn InstallationSupplier>>,
    catalog: Option<Arc<TableCatalog>>,
}

impl PgDeploy {
    /// Empty registry using the bundled catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `supplier`; earlier registrations win on ties.
    #[must_use]
    pub fn with_supplier(mut self, supplier: impl InstallationSupplier + 'static) -> Self {
        self.suppliers.push(Arc::new(supplier));
        self
    }

    /// Use `catalog` instead of the one suppliers or the bundled table provide.
    #[must_use]
    pub fn with_catalog(mut self, catalog: TableCatalog) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Registered suppliers.
    #[must_use]
    pub fn suppliers(&self) -> &[Arc<dyn InstallationSupplier>] {
        &self.suppliers
    }

    /// First supplier satisfying `requested`.
    #[must_use]
    pub fn find_supplier(&self, requested: &SupplierFeatures) -> Option<Arc<dyn InstallationSupplier>> {
        let found = self
            .suppliers
            .iter()
            .find(|supplier| supplier.accepts(requested))
            .cloned();
        debug!(requested = ?requested, found = found.is_some(), "supplier lookup");
        found
    }

    /// Unpack `supplier` into `destination` and verify the result.
    ///
    /// # Errors
    ///
    /// Returns unpack errors from the supplier, [`DeployError::BadInstallation`]
    /// or [`DeployError::ExtraFolders`] when verification fails.
    pub fn install(
        &self,
        supplier: &dyn InstallationSupplier,
        options: InstallOptions,
        destination: &Path,
    ) -> DeployResult<Installation> {
        let folders = options.folders();
        fs::create_dir_all(destination)
            .map_err(|source| DeployError::io("install.create_destination", destination, source))?;
        supplier.unpack_folders(destination, &folders)?;
        supplier.check_installation(destination, &folders)?;

        let catalog = match &self.catalog {
            Some(catalog) => Arc::clone(catalog) as SharedCatalog,
            None => supplier.catalog()?,
        };
        let installation = Installation::open(destination, supplier.router(), catalog)?;
        info!(
            destination = %destination.display(),
            release = ?supplier.features(),
            "installation ready"
        );
        Ok(installation)
    }

    /// Attach to an existing installation at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InstallationNotFound`] when `path` is not a
    /// directory and [`DeployError::Catalog`] when the bundled catalog is unusable.
    pub fn retrieve_installation(&self, path: &Path) -> DeployResult<Installation> {
        let router: Arc<dyn Router> = Arc::new(DefaultRouter);
        Installation::open(path, router, self.catalog()?)
    }

    /// Attach to the cluster in `data_dir` served by the installation at `install_dir`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`PgDeploy::retrieve_installation`] and
    /// [`Installation::open_cluster`].
    pub fn retrieve_cluster(&self, data_dir: &Path, install_dir: &Path) -> DeployResult<Cluster> {
        self.retrieve_installation(install_dir)?.open_cluster(data_dir)
    }

    fn catalog(&self) -> DeployResult<SharedCatalog> {
        if let Some(catalog) = &self.catalog {
            return Ok(Arc::clone(catalog) as SharedCatalog);
        }
        let bundled = TableCatalog::bundled().map_err(|source| DeployError::Catalog { source })?;
        Ok(Arc::new(bundled))
    }
}
