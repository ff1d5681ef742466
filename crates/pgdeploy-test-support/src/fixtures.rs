//! Test fixtures and environment helpers.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Catalog table in the `name|unit-hint|type-tag|context` format.
pub const CATALOG_TABLE: &str = "\
# name|unit-hint|type-tag|context
shared_buffers|8kB|integer|postmaster
work_mem|kB|integer|user
max_connections||integer|postmaster
checkpoint_timeout|s|integer|sighup
checkpoint_completion_target||real|sighup
fsync||bool|sighup
wal_level||enum|postmaster
log_min_duration_statement|ms|integer|superuser
";

/// Excerpt of a freshly initialised `postgresql.conf`.
pub const POSTGRESQL_CONF: &str = "\
# -----------------------------
# PostgreSQL configuration file
# -----------------------------

#listen_addresses = 'localhost'\t\t# what IP address(es) to listen on;
max_connections = 100\t\t\t# (change requires restart)
#port = 5432\t\t\t\t# (change requires restart)

# - Memory -

shared_buffers = 128MB\t\t\t# min 128kB
#work_mem = 4MB\t\t\t\t# min 64kB
dynamic_shared_memory_type = posix\t# the default is the first option

#fsync = on\t\t\t\t# flush data to disk for crash safety
#checkpoint_timeout = 5min\t\t# range 30s-1d
";

/// Minimal `pg_hba.conf` content.
pub const PG_HBA_CONF: &str = "\
# TYPE  DATABASE        USER            ADDRESS                 METHOD
local   all             all                                     trust
host    all             all             127.0.0.1/32            trust
";

/// Split fixture text into the line list the merge engine consumes.
#[must_use]
pub fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Directory holding `pg_ctl` and `initdb` from `PGDEPLOY_TEST_PG_BIN`, when
/// the variable points at a real toolchain.
#[must_use]
pub fn postgres_bin_dir() -> Option<PathBuf> {
    postgres_bin_dir_from(std::env::var_os("PGDEPLOY_TEST_PG_BIN").map(PathBuf::from))
}

fn postgres_bin_dir_from(candidate: Option<PathBuf>) -> Option<PathBuf> {
    let dir = candidate?;
    let usable = binary_runs(&dir.join("pg_ctl")) && binary_runs(&dir.join("initdb"));
    usable.then_some(dir)
}

fn binary_runs(path: &Path) -> bool {
    Command::new(path)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
