//! Cluster creation through `initdb`.

use std::ffi::OsString;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::CtlResult;
use crate::process::run_binary;

const DEFAULT_ENCODING: &str = "UTF8";

/// Options passed to `initdb`.
///
/// Defaults: `UTF8` encoding, server default locale and superuser, no data checksums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterCreationOptions {
    encoding: Option<String>,
    locale: Option<String>,
    superuser: Option<String>,
    data_checksums: bool,
}

impl Default for ClusterCreationOptions {
    fn default() -> Self {
        Self {
            encoding: Some(DEFAULT_ENCODING.to_string()),
            locale: None,
            superuser: None,
            data_checksums: false,
        }
    }
}

impl ClusterCreationOptions {
    /// Use `encoding` for the template databases.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Let `initdb` derive the encoding from the locale.
    #[must_use]
    pub fn with_server_default_encoding(mut self) -> Self {
        self.encoding = None;
        self
    }

    /// Use `locale` for the cluster.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Name the bootstrap superuser.
    #[must_use]
    pub fn with_superuser(mut self, superuser: impl Into<String>) -> Self {
        self.superuser = Some(superuser.into());
        self
    }

    /// Enable or disable page checksums.
    #[must_use]
    pub const fn with_data_checksums(mut self, enabled: bool) -> Self {
        self.data_checksums = enabled;
        self
    }

    /// Command line flags for `initdb`.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        let flagged = [
            ("-E", &self.encoding),
            ("--locale", &self.locale),
            ("-U", &self.superuser),
        ];
        for (flag, value) in flagged
            .into_iter()
            .filter_map(|(flag, value)| value.as_ref().map(|value| (flag, value)))
        {
            args.push(flag.to_string());
            args.push(value.clone());
        }
        if self.data_checksums {
            args.push("-k".to_string());
        }
        args
    }
}

/// Initialise a cluster in `destination` with the `initdb` at `binary`.
///
/// # Errors
///
/// Returns any error from [`run_binary`].
pub fn run_initdb(
    binary: &Path,
    destination: &Path,
    options: &ClusterCreationOptions,
) -> CtlResult<String> {
    let mut args = vec![OsString::from("-D"), destination.as_os_str().to_os_string()];
    args.extend(options.to_args().into_iter().map(OsString::from));
    let output = run_binary(binary, args, "initdb")?;
    info!(destination = %destination.display(), "cluster initialised");
    Ok(output)
}
