//! Zip package builders for installation tests.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use zip::ZipWriter;
use zip::write::FileOptions;

/// Write a zip archive holding `entries` (`path`, `contents`, `unix mode`).
///
/// Paths ending in `/` become directory entries.
///
/// # Errors
///
/// Returns an error when the archive cannot be created or written.
pub fn write_zip(archive: &Path, entries: &[(&str, &[u8], u32)]) -> Result<()> {
    let file = File::create(archive)
        .with_context(|| format!("failed to create {}", archive.display()))?;
    let mut zip = ZipWriter::new(file);
    for (path, contents, mode) in entries {
        let options = FileOptions::default().unix_permissions(*mode);
        if path.ends_with('/') {
            zip.add_directory(*path, options)
                .with_context(|| format!("failed to add directory {path}"))?;
            continue;
        }
        zip.start_file(*path, options)
            .with_context(|| format!("failed to add file {path}"))?;
        zip.write_all(contents)
            .with_context(|| format!("failed to write file {path}"))?;
    }
    zip.finish().context("failed to finish zip archive")?;
    Ok(())
}

/// Write a package laid out like a binary `PostgreSQL` distribution:
/// `bin/`, `lib/`, `share/` and `include/` with a few representative files.
///
/// # Errors
///
/// Returns an error when the archive cannot be written.
pub fn write_postgres_package(archive: &Path) -> Result<()> {
    write_zip(
        archive,
        &[
            ("bin/", b"", 0o755),
            ("bin/pg_ctl", b"#!/bin/sh\necho pg_ctl\n", 0o755),
            ("bin/initdb", b"#!/bin/sh\necho initdb\n", 0o755),
            ("lib/", b"", 0o755),
            ("lib/libpq.so.5", b"\x7fELF", 0o644),
            ("share/", b"", 0o755),
            ("share/postgresql.conf.sample", b"#work_mem = 4MB\n", 0o644),
            ("include/", b"", 0o755),
            ("include/libpq-fe.h", b"/* header */\n", 0o644),
        ],
    )
}
