//! Error types and shared state for command handlers.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

use anyhow::{Context, anyhow};
use pgdeploy_config::{ConfigError, TableCatalog};
use pgdeploy_core::{DeployError, PgDeploy};
use pgdeploy_ctl::CtlError;

use crate::cli::OutputFormat;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { .. } | ConfigError::InvalidCatalogLine { .. } => {
                Self::failure(anyhow::Error::new(err).context("failed to load property catalog"))
            }
            other => Self::validation(other.to_string()),
        }
    }
}

impl From<DeployError> for CliError {
    fn from(err: DeployError) -> Self {
        match err {
            DeployError::Catalog { source } => source.into(),
            DeployError::InvalidVersion { value } => {
                Self::validation(format!("'{value}' is not a postgres major version"))
            }
            DeployError::InvalidPlatform { value } => {
                Self::validation(format!("'{value}' is not an os_arch platform"))
            }
            DeployError::ClusterDirectoryNotEmpty { path } => Self::validation(format!(
                "cluster directory {} is not empty",
                path.display()
            )),
            other => Self::failure(describe_deploy_failure(other)),
        }
    }
}

fn describe_deploy_failure(err: DeployError) -> anyhow::Error {
    let detail = match &err {
        DeployError::Ctl {
            source: CtlError::ProcessFailed {
                description,
                stderr,
                ..
            },
            ..
        } => Some(format!("{description}: {}", stderr.trim())),
        DeployError::Ctl {
            source: CtlError::BinaryNotFound { binary },
            ..
        } => Some(format!("{} does not exist", binary.display())),
        DeployError::BadInstallation {
            missing,
            not_directories,
        } => Some(format!(
            "missing: [{}], not directories: [{}]",
            join_paths(missing),
            join_paths(not_directories)
        )),
        DeployError::ExtraFolders { found, .. } => {
            Some(format!("unexpected folders: {}", found.join(", ")))
        }
        DeployError::Io { path, .. }
        | DeployError::Zip { path, .. }
        | DeployError::UnreachablePackage { path }
        | DeployError::InstallationNotFound { path }
        | DeployError::ClusterNotFound { path }
        | DeployError::BadCluster { path } => Some(path.display().to_string()),
        _ => None,
    };
    let error = anyhow::Error::new(err);
    match detail {
        Some(detail) => error.context(detail),
        None => error,
    }
}

fn join_paths(paths: &[std::path::PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// State derived from global flags.
pub(crate) struct AppContext {
    pub(crate) output: OutputFormat,
    pub(crate) catalog: TableCatalog,
    pub(crate) deploy: PgDeploy,
}

impl AppContext {
    pub(crate) fn new(output: OutputFormat, catalog_path: Option<&Path>) -> CliResult<Self> {
        let catalog = match catalog_path {
            Some(path) => TableCatalog::load(path)?,
            None => TableCatalog::bundled()?,
        };
        let deploy = PgDeploy::new().with_catalog(catalog.clone());
        Ok(Self {
            output,
            catalog,
            deploy,
        })
    }
}

pub(crate) fn read_text(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(CliError::failure)
}

pub(crate) fn json_failure(err: &serde_json::Error) -> CliError {
    CliError::failure(anyhow!("failed to format JSON: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn config_errors_are_validation_failures() {
        let err: CliError = ConfigError::PropertyNotFound {
            property: "bogus".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "property 'bogus' not found in catalog");
    }

    #[test]
    fn deploy_failures_carry_detail() {
        let err: CliError = DeployError::Ctl {
            operation: "cluster.start",
            source: CtlError::ProcessFailed {
                description: "pg_ctl start".to_string(),
                code: Some(1),
                stderr: "could not bind IPv4 address\n".to_string(),
            },
        }
        .into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("could not bind"));

        let err: CliError = DeployError::InstallationNotFound {
            path: PathBuf::from("/opt/pg"),
        }
        .into();
        assert!(err.display_message().starts_with("/opt/pg"));
    }
}
