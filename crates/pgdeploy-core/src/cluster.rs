//! Data directories and their running servers.
//!
//! # Design
//! - Lifecycle commands delegate to `pg_ctl`; failures keep the operation name.
//! - Applying configuration merges into `postgresql.conf` first, then signals
//!   the server only when it is running: restart when a touched setting needs
//!   it, reload when only reloadable values changed, nothing otherwise.

use std::path::{Path, PathBuf};

use pgdeploy_conffile::{MergeReport, apply_to_file, overwrite, read_lines};
use pgdeploy_config::{ConfigurationSet, ConfigurationSetBuilder};
use pgdeploy_ctl::{PgCtl, ServerStatus};
use serde::Serialize;
use tracing::info;

use crate::error::{DeployError, DeployResult};
use crate::installation::Installation;

/// Signal sent to the server after a configuration change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigAction {
    /// Server was stopped or nothing changed.
    None,
    /// Configuration re-read without downtime.
    Reload,
    /// Server restarted.
    Restart,
}

/// Outcome of [`Cluster::apply_config`].
#[derive(Debug, Clone)]
pub struct ConfigOutcome {
    report: MergeReport,
    action: ConfigAction,
}

impl ConfigOutcome {
    /// Merge result written to `postgresql.conf`.
    #[must_use]
    pub const fn report(&self) -> &MergeReport {
        &self.report
    }

    /// Signal that was sent.
    #[must_use]
    pub const fn action(&self) -> ConfigAction {
        self.action
    }
}

/// Cluster data directory bound to the installation that serves it.
#[derive(Debug, Clone)]
pub struct Cluster {
    installation: Installation,
    data_dir: PathBuf,
    ctl: PgCtl,
}

impl Cluster {
    pub(crate) fn new(installation: Installation, data_dir: PathBuf) -> Self {
        let ctl = PgCtl::new(installation.pg_ctl(), data_dir.clone());
        Self {
            installation,
            data_dir,
            ctl,
        }
    }

    /// Data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Serving installation.
    #[must_use]
    pub const fn installation(&self) -> &Installation {
        &self.installation
    }

    /// `postgresql.conf` of this cluster.
    #[must_use]
    pub fn postgresql_conf(&self) -> PathBuf {
        self.installation.router().postgresql_conf(&self.data_dir)
    }

    /// `pg_hba.conf` of this cluster.
    #[must_use]
    pub fn pg_hba_conf(&self) -> PathBuf {
        self.installation.router().pg_hba_conf(&self.data_dir)
    }

    /// Start the server.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Ctl`] when `pg_ctl` fails.
    pub fn start(&self, log: Option<&Path>) -> DeployResult<()> {
        self.ctl
            .start(log)
            .map_err(|source| DeployError::ctl("cluster.start", source))
    }

    /// Stop the server.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Ctl`] when `pg_ctl` fails.
    pub fn stop(&self, log: Option<&Path>) -> DeployResult<()> {
        self.ctl
            .stop(log)
            .map_err(|source| DeployError::ctl("cluster.stop", source))
    }

    /// Restart the server.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Ctl`] when `pg_ctl` fails.
    pub fn restart(&self, log: Option<&Path>) -> DeployResult<()> {
        self.ctl
            .restart(log)
            .map_err(|source| DeployError::ctl("cluster.restart", source))
    }

    /// Make the server re-read its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Ctl`] when `pg_ctl` fails.
    pub fn reload(&self, log: Option<&Path>) -> DeployResult<()> {
        self.ctl
            .reload(log)
            .map_err(|source| DeployError::ctl("cluster.reload", source))
    }

    /// Current server state.
    #[must_use]
    pub fn status(&self, log: Option<&Path>) -> ServerStatus {
        self.ctl.status(log)
    }

    /// Builder validating against the installation's catalog.
    #[must_use]
    pub fn config_builder(&self) -> ConfigurationSetBuilder<'_> {
        ConfigurationSetBuilder::new(&**self.installation.catalog())
    }

    /// Current `postgresql.conf` lines.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::ConfFile`] when the file cannot be read.
    pub fn config_lines(&self) -> DeployResult<Vec<String>> {
        read_lines(&self.postgresql_conf())
            .map_err(|source| DeployError::conffile("cluster.read_config", source))
    }

    /// Merge `set` into `postgresql.conf` and signal a running server.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::ConfFile`] when the file cannot be rewritten and
    /// [`DeployError::Ctl`] when the follow-up signal fails.
    pub fn apply_config(
        &self,
        set: &ConfigurationSet,
        log: Option<&Path>,
    ) -> DeployResult<ConfigOutcome> {
        let report = apply_to_file(&self.postgresql_conf(), set)
            .map_err(|source| DeployError::conffile("cluster.apply_config", source))?;

        let action = if self.status(log) == ServerStatus::Stopped {
            ConfigAction::None
        } else if report.requires_restart() {
            self.restart(log)?;
            ConfigAction::Restart
        } else if report.changes_values() {
            self.reload(log)?;
            ConfigAction::Reload
        } else {
            ConfigAction::None
        };

        info!(
            data_dir = %self.data_dir.display(),
            changes = report.changes().len(),
            action = ?action,
            "configuration applied"
        );
        Ok(ConfigOutcome { report, action })
    }

    /// Replace `pg_hba.conf` with `content`, reloading a running server.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::ConfFile`] when the file cannot be written and
    /// [`DeployError::Ctl`] when the reload fails.
    pub fn set_pg_hba(&self, content: &str, log: Option<&Path>) -> DeployResult<ConfigAction> {
        overwrite(&self.pg_hba_conf(), content)
            .map_err(|source| DeployError::conffile("cluster.set_pg_hba", source))?;
        if self.status(log) == ServerStatus::Active {
            self.reload(log)?;
            return Ok(ConfigAction::Reload);
        }
        Ok(ConfigAction::None)
    }

    /// Replace `pg_hba.conf` with the contents of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Io`] when `source` cannot be read, otherwise as
    /// [`Cluster::set_pg_hba`].
    pub fn set_pg_hba_from_file(&self, source: &Path, log: Option<&Path>) -> DeployResult<ConfigAction> {
        let content = std::fs::read_to_string(source)
            .map_err(|err| DeployError::io("cluster.read_pg_hba", source, err))?;
        self.set_pg_hba(&content, log)
    }
}
