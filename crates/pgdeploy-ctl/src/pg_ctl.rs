//! Server control through `pg_ctl`.
//!
//! # Design
//! - Arguments follow `-D <data> [-l <log>] <command> [extra]`.
//! - `status` never fails: output starting with `pg_ctl: server is running`
//!   means active, anything else (including errors) means stopped.

use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::CtlResult;
use crate::process::run_binary;

const RUNNING_PREFIX: &str = "pg_ctl: server is running";

/// Observed state of a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// The postmaster is running.
    Active,
    /// No server is running for the data directory.
    Stopped,
}

impl ServerStatus {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Stopped => "stopped",
        }
    }
}

impl Display for ServerStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// `pg_ctl` bound to one data directory.
#[derive(Debug, Clone)]
pub struct PgCtl {
    binary: PathBuf,
    data_dir: PathBuf,
    wait_timeout: Option<Duration>,
}

impl PgCtl {
    /// Control the cluster in `data_dir` with the `pg_ctl` at `binary`.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            data_dir: data_dir.into(),
            wait_timeout: None,
        }
    }

    /// Pass `-t <seconds>` when starting.
    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    /// Location of the `pg_ctl` executable.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Controlled data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Start the server and wait until it accepts connections.
    ///
    /// # Errors
    ///
    /// Returns any error from [`run_binary`].
    pub fn start(&self, log: Option<&Path>) -> CtlResult<()> {
        let mut extra = vec![OsString::from("-w")];
        if let Some(timeout) = self.wait_timeout {
            extra.push("-t".into());
            extra.push(timeout.as_secs().to_string().into());
        }
        self.run("start", log, extra)?;
        info!(data_dir = %self.data_dir.display(), "server started");
        Ok(())
    }

    /// Stop the server.
    ///
    /// # Errors
    ///
    /// Returns any error from [`run_binary`].
    pub fn stop(&self, log: Option<&Path>) -> CtlResult<()> {
        self.run("stop", log, Vec::new())?;
        info!(data_dir = %self.data_dir.display(), "server stopped");
        Ok(())
    }

    /// Restart the server.
    ///
    /// # Errors
    ///
    /// Returns any error from [`run_binary`].
    pub fn restart(&self, log: Option<&Path>) -> CtlResult<()> {
        self.run("restart", log, Vec::new())?;
        info!(data_dir = %self.data_dir.display(), "server restarted");
        Ok(())
    }

    /// Ask the server to re-read its configuration files.
    ///
    /// # Errors
    ///
    /// Returns any error from [`run_binary`].
    pub fn reload(&self, log: Option<&Path>) -> CtlResult<()> {
        self.run("reload", log, Vec::new())?;
        info!(data_dir = %self.data_dir.display(), "server reloaded");
        Ok(())
    }

    /// Current server state.
    #[must_use]
    pub fn status(&self, log: Option<&Path>) -> ServerStatus {
        match self.run("status", log, Vec::new()) {
            Ok(output) if output.starts_with(RUNNING_PREFIX) => ServerStatus::Active,
            Ok(_) => ServerStatus::Stopped,
            Err(err) => {
                debug!(error = %err, "pg_ctl status treated as stopped");
                ServerStatus::Stopped
            }
        }
    }

    /// Arguments for `command`, in invocation order.
    #[must_use]
    pub fn arguments(&self, command: &str, log: Option<&Path>, extra: &[OsString]) -> Vec<OsString> {
        let mut args = vec![OsString::from("-D"), self.data_dir.clone().into_os_string()];
        if let Some(log) = log {
            args.push("-l".into());
            args.push(log.as_os_str().to_os_string());
        }
        args.push(command.into());
        args.extend_from_slice(extra);
        args
    }

    fn run(&self, command: &str, log: Option<&Path>, extra: Vec<OsString>) -> CtlResult<String> {
        let args = self.arguments(command, log, &extra);
        run_binary(&self.binary, args, &format!("pg_ctl - {command}"))
    }
}
