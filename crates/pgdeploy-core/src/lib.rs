#![forbid(unsafe_code)]
#![deny(
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Installation and cluster management for `PostgreSQL`.
//!
//! Layout: `version.rs` (releases and platforms), `router.rs` (path layout),
//! `layout.rs` (installation folders), `supplier.rs` (binary sources),
//! `installation.rs`, `cluster.rs`, `deploy.rs` (entry point), `error.rs`.

pub mod cluster;
pub mod deploy;
pub mod error;
pub mod installation;
pub mod layout;
pub mod router;
pub mod supplier;
pub mod version;

pub use cluster::{Cluster, ConfigAction, ConfigOutcome};
pub use deploy::PgDeploy;
pub use error::{DeployError, DeployResult};
pub use installation::Installation;
pub use layout::{
    InstallOptions, InstallationFolder, check_installation_complete,
    check_installation_extra_folders,
};
pub use pgdeploy_ctl::{ClusterCreationOptions, ServerStatus};
pub use router::{DefaultRouter, Router};
pub use supplier::{InstallationSupplier, SharedCatalog, SupplierFeatures, ZipSupplier};
pub use version::{Platform, PostgresMajorVersion};
