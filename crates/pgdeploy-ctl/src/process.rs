//! Blocking execution of toolchain binaries.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{CtlError, CtlResult};

/// Run `binary` with `args` and return its standard output.
///
/// `description` names the invocation in logs and errors (`pg_ctl - start`).
///
/// # Errors
///
/// - [`CtlError::BinaryNotFound`] when `binary` does not exist.
/// - [`CtlError::Spawn`] when the process cannot be started.
/// - [`CtlError::ProcessFailed`] when it exits unsuccessfully.
pub fn run_binary<I, S>(binary: &Path, args: I, description: &str) -> CtlResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    if !binary.exists() {
        return Err(CtlError::BinaryNotFound {
            binary: binary.to_path_buf(),
        });
    }

    let mut command = Command::new(binary);
    command.args(args);
    debug!(binary = %binary.display(), command = ?command, "running {description}");

    let output = command.output().map_err(|source| CtlError::Spawn {
        description: description.to_string(),
        binary: binary.to_path_buf(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(
            code = ?output.status.code(),
            stderr = %stderr,
            "{description} failed"
        );
        return Err(CtlError::ProcessFailed {
            description: description.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pgdeploy_test_support::fake_bin::write_script;

    #[test]
    fn missing_binary_is_reported() {
        let err = run_binary(Path::new("/definitely/missing/pg_ctl"), ["status"], "pg_ctl - status")
            .expect_err("missing binary");
        assert!(matches!(err, CtlError::BinaryNotFound { .. }));
    }

    #[test]
    fn stdout_is_returned_and_failures_carry_stderr() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let script = temp.path().join("tool");
        write_script(
            &script,
            "#!/bin/sh\nif [ \"$1\" = ok ]; then echo fine; exit 0; fi\necho broken >&2\nexit 4\n",
        )?;

        assert_eq!(run_binary(&script, ["ok"], "tool - ok")?, "fine\n");

        let err = run_binary(&script, ["bad"], "tool - bad").expect_err("non-zero exit");
        match err {
            CtlError::ProcessFailed {
                description,
                code,
                stderr,
            } => {
                assert_eq!(description, "tool - bad");
                assert_eq!(code, Some(4));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }
}
