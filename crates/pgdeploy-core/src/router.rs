//! Locations of files inside installations and data directories.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Resolves well-known paths relative to an installation or cluster directory.
pub trait Router: Debug + Send + Sync {
    /// `postgresql.conf` inside a data directory.
    fn postgresql_conf(&self, data_dir: &Path) -> PathBuf;
    /// `pg_hba.conf` inside a data directory.
    fn pg_hba_conf(&self, data_dir: &Path) -> PathBuf;
    /// `initdb` inside an installation.
    fn initdb(&self, install_dir: &Path) -> PathBuf;
    /// `pg_ctl` inside an installation.
    fn pg_ctl(&self, install_dir: &Path) -> PathBuf;
}

/// Layout of the upstream binary distributions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRouter;

impl Router for DefaultRouter {
    fn postgresql_conf(&self, data_dir: &Path) -> PathBuf {
        data_dir.join("postgresql.conf")
    }

    fn pg_hba_conf(&self, data_dir: &Path) -> PathBuf {
        data_dir.join("pg_hba.conf")
    }

    fn initdb(&self, install_dir: &Path) -> PathBuf {
        install_dir.join("bin").join("initdb")
    }

    fn pg_ctl(&self, install_dir: &Path) -> PathBuf {
        install_dir.join("bin").join("pg_ctl")
    }
}
