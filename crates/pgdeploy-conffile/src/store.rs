//! File access around the merge engine.
//!
//! Writes go to a sibling temporary file that is renamed over the target, so
//! readers never observe a half-written configuration.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use pgdeploy_config::ConfigurationSet;
use tracing::info;

use crate::error::{ConfFileError, ConfFileResult};
use crate::merge::{MergeReport, merge_lines};

/// Read `path` as a list of lines without terminators.
///
/// # Errors
///
/// Returns [`ConfFileError::Io`] when the file cannot be read.
pub fn read_lines(path: &Path) -> ConfFileResult<Vec<String>> {
    let text =
        fs::read_to_string(path).map_err(|source| ConfFileError::io("read_lines", path, source))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Replace `path` with `lines`, each terminated by a newline.
///
/// # Errors
///
/// Returns [`ConfFileError::Io`] when the temporary file cannot be written or renamed.
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> ConfFileResult<()> {
    let mut text = String::new();
    for line in lines {
        text.push_str(line.as_ref());
        text.push('\n');
    }
    overwrite(path, &text)
}

/// Replace the whole content of `path`.
///
/// # Errors
///
/// Returns [`ConfFileError::Io`] when the temporary file cannot be written or renamed.
pub fn overwrite(path: &Path, content: &str) -> ConfFileResult<()> {
    let staging = staging_path(path);
    let result = stage(path, &staging, content).and_then(|()| {
        fs::rename(&staging, path)
            .map_err(|source| ConfFileError::io("overwrite.rename", path, source))
    });
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn stage(path: &Path, staging: &Path, content: &str) -> ConfFileResult<()> {
    fs::write(staging, content)
        .map_err(|source| ConfFileError::io("overwrite.write", staging, source))?;
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(staging, metadata.permissions())
            .map_err(|source| ConfFileError::io("overwrite.permissions", staging, source))?;
    }
    Ok(())
}

/// Merge `set` into the file at `path` without writing anything.
///
/// # Errors
///
/// Returns [`ConfFileError::Io`] when the file cannot be read.
pub fn plan_for_file(path: &Path, set: &ConfigurationSet) -> ConfFileResult<MergeReport> {
    let lines = read_lines(path)?;
    Ok(merge_lines(&lines, set))
}

/// Merge `set` into the file at `path` and persist the result.
///
/// The file is left untouched when the merge changes nothing.
///
/// # Errors
///
/// Returns [`ConfFileError::Io`] when the file cannot be read or written.
pub fn apply_to_file(path: &Path, set: &ConfigurationSet) -> ConfFileResult<MergeReport> {
    let report = plan_for_file(path, set)?;
    if report.is_unchanged() {
        return Ok(report);
    }
    overwrite(path, &report.render())?;
    info!(
        path = %path.display(),
        changed = report.changes().len(),
        "configuration file updated"
    );
    Ok(report)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".pgdeploy-tmp");
    path.with_file_name(name)
}
