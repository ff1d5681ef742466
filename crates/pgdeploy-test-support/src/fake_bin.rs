//! Shell-script stand-ins for the `PostgreSQL` toolchain.
//!
//! # Design
//! - `pg_ctl` tracks the server state through a `postmaster.pid` marker in the
//!   data directory and answers `status` the way the real tool does.
//! - Every invocation is appended to `<bin>/<tool>.calls` so tests can assert
//!   on the arguments that were passed.
//! - `initdb` writes the two files a cluster must contain.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const PG_CTL_SCRIPT: &str = r#"#!/bin/sh
echo "$*" >> "$(dirname "$0")/pg_ctl.calls"
data=""
log=""
command=""
previous=""
for arg in "$@"; do
  case "$previous" in
    -D) data="$arg" ;;
    -l) log="$arg" ;;
  esac
  case "$arg" in
    start|stop|restart|reload|status) command="$arg" ;;
  esac
  previous="$arg"
done
pid="$data/postmaster.pid"
if [ -n "$log" ]; then
  echo "pg_ctl $command" >> "$log"
fi
case "$command" in
  start|restart)
    touch "$pid"
    echo "server started"
    ;;
  stop)
    if [ ! -f "$pid" ]; then
      echo "pg_ctl: PID file \"$pid\" does not exist" >&2
      exit 1
    fi
    rm -f "$pid"
    echo "server stopped"
    ;;
  reload)
    if [ ! -f "$pid" ]; then
      echo "pg_ctl: PID file \"$pid\" does not exist" >&2
      exit 1
    fi
    echo "server signaled"
    ;;
  status)
    if [ -f "$pid" ]; then
      echo "pg_ctl: server is running (PID: 4242)"
      exit 0
    fi
    echo "pg_ctl: no server running"
    exit 3
    ;;
  *)
    echo "pg_ctl: unrecognized operation" >&2
    exit 1
    ;;
esac
"#;

const INITDB_SCRIPT: &str = r#"#!/bin/sh
echo "$*" >> "$(dirname "$0")/initdb.calls"
data=""
previous=""
for arg in "$@"; do
  if [ "$previous" = "-D" ]; then
    data="$arg"
  fi
  previous="$arg"
done
if [ -z "$data" ]; then
  echo "initdb: no data directory specified" >&2
  exit 1
fi
mkdir -p "$data"
printf '#listen_addresses = '"'"'localhost'"'"'\nmax_connections = 100\nshared_buffers = 128MB\n#work_mem = 4MB\n' > "$data/postgresql.conf"
printf 'local all all trust\n' > "$data/pg_hba.conf"
echo "Success. You can now start the database server."
"#;

const BROKEN_INITDB_SCRIPT: &str = r#"#!/bin/sh
echo "$*" >> "$(dirname "$0")/initdb.calls"
echo "initdb: could not create directory" >&2
exit 1
"#;

/// Scripted toolchain installed under `<root>/bin`.
#[derive(Debug, Clone)]
pub struct FakeToolchain {
    root: PathBuf,
}

impl FakeToolchain {
    /// Lay out `bin/pg_ctl`, `bin/initdb` and an empty `lib/` under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error when the scripts cannot be written.
    pub fn install(root: &Path) -> Result<Self> {
        Self::install_with(root, INITDB_SCRIPT)
    }

    /// Same as [`FakeToolchain::install`], but `initdb` always fails.
    ///
    /// # Errors
    ///
    /// Returns an error when the scripts cannot be written.
    pub fn install_with_failing_initdb(root: &Path) -> Result<Self> {
        Self::install_with(root, BROKEN_INITDB_SCRIPT)
    }

    fn install_with(root: &Path, initdb: &str) -> Result<Self> {
        let bin = root.join("bin");
        fs::create_dir_all(&bin)
            .with_context(|| format!("failed to create {}", bin.display()))?;
        fs::create_dir_all(root.join("lib"))
            .with_context(|| format!("failed to create lib under {}", root.display()))?;
        write_script(&bin.join("pg_ctl"), PG_CTL_SCRIPT)?;
        write_script(&bin.join("initdb"), initdb)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Installation root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the fake `pg_ctl`.
    #[must_use]
    pub fn pg_ctl(&self) -> PathBuf {
        self.root.join("bin").join("pg_ctl")
    }

    /// Path of the fake `initdb`.
    #[must_use]
    pub fn initdb(&self) -> PathBuf {
        self.root.join("bin").join("initdb")
    }

    /// Recorded argument lines for `tool` (`pg_ctl` or `initdb`).
    #[must_use]
    pub fn calls(&self, tool: &str) -> Vec<String> {
        fs::read_to_string(self.root.join("bin").join(format!("{tool}.calls")))
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Write an executable shell script.
///
/// # Errors
///
/// Returns an error when the file cannot be written or made executable.
pub fn write_script(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("failed to mark {} executable", path.display()))?;
    }
    Ok(())
}
