//! Argument parsing and command dispatch.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pgdeploy_core::{Platform, PostgresMajorVersion};
use pgdeploy_telemetry::{CommandSpan, DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use tracing::debug;

use crate::commands::cluster::{
    handle_cluster_configure, handle_cluster_hba, handle_cluster_init, handle_cluster_lifecycle,
};
use crate::commands::conf::{handle_conf_apply, handle_conf_check};
use crate::commands::install::handle_install;
use crate::context::{AppContext, CliResult};

/// Parse the process arguments, run the command and return the exit code.
#[must_use]
pub fn run() -> i32 {
    run_from(std::env::args_os())
}

/// Same as [`run`] with explicit arguments (the first one is the program name).
#[must_use]
pub fn run_from<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };

    let format = cli
        .log_format
        .as_deref()
        .map_or_else(LogFormat::infer, LogFormat::from_name);
    // A subscriber may already be installed by an embedding process.
    let _ = init_logging(&LoggingConfig {
        level: &cli.log_level,
        format,
        build_sha: option_env!("PGDEPLOY_BUILD_SHA").unwrap_or("dev"),
    });

    let _span = CommandSpan::enter(command_label(&cli.command));
    match dispatch(cli) {
        Ok(()) => 0,
        Err(err) => {
            debug!(exit_code = err.exit_code(), "command failed");
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn dispatch(cli: Cli) -> CliResult<()> {
    let ctx = AppContext::new(cli.output, cli.catalog.as_deref())?;
    match cli.command {
        Command::Conf(conf) => match conf {
            ConfCommand::Check(args) => handle_conf_check(&ctx, &args),
            ConfCommand::Apply(args) => handle_conf_apply(&ctx, &args),
        },
        Command::Cluster(cluster) => match cluster {
            ClusterCommand::Status(args) => handle_cluster_lifecycle(&ctx, &args, Lifecycle::Status),
            ClusterCommand::Start(args) => handle_cluster_lifecycle(&ctx, &args, Lifecycle::Start),
            ClusterCommand::Stop(args) => handle_cluster_lifecycle(&ctx, &args, Lifecycle::Stop),
            ClusterCommand::Restart(args) => {
                handle_cluster_lifecycle(&ctx, &args, Lifecycle::Restart)
            }
            ClusterCommand::Reload(args) => handle_cluster_lifecycle(&ctx, &args, Lifecycle::Reload),
            ClusterCommand::Init(args) => handle_cluster_init(&ctx, &args),
            ClusterCommand::Configure(args) => handle_cluster_configure(&ctx, &args),
            ClusterCommand::Hba(args) => handle_cluster_hba(&ctx, &args),
        },
        Command::Install(args) => handle_install(&ctx, &args),
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Conf(ConfCommand::Check(_)) => "conf check",
        Command::Conf(ConfCommand::Apply(_)) => "conf apply",
        Command::Cluster(ClusterCommand::Status(_)) => "cluster status",
        Command::Cluster(ClusterCommand::Start(_)) => "cluster start",
        Command::Cluster(ClusterCommand::Stop(_)) => "cluster stop",
        Command::Cluster(ClusterCommand::Restart(_)) => "cluster restart",
        Command::Cluster(ClusterCommand::Reload(_)) => "cluster reload",
        Command::Cluster(ClusterCommand::Init(_)) => "cluster init",
        Command::Cluster(ClusterCommand::Configure(_)) => "cluster configure",
        Command::Cluster(ClusterCommand::Hba(_)) => "cluster hba",
        Command::Install(_) => "install",
    }
}

#[derive(Parser)]
#[command(name = "pgdeploy", about = "Install PostgreSQL binaries and manage clusters")]
pub(crate) struct Cli {
    #[arg(long, global = true, env = "PGDEPLOY_CATALOG", help = "Property catalog table")]
    catalog: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(long, global = true, env = "PGDEPLOY_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(long, global = true, env = "PGDEPLOY_LOG_FORMAT")]
    log_format: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect and edit configuration files.
    #[command(subcommand)]
    Conf(ConfCommand),
    /// Manage a cluster data directory.
    #[command(subcommand)]
    Cluster(ClusterCommand),
    /// Unpack a binary package.
    Install(InstallArgs),
}

#[derive(Subcommand)]
enum ConfCommand {
    /// Parse assignments against the catalog.
    Check(ConfCheckArgs),
    /// Merge assignments into a configuration file.
    Apply(ConfApplyArgs),
}

#[derive(Subcommand)]
enum ClusterCommand {
    Status(ClusterArgs),
    Start(ClusterArgs),
    Stop(ClusterArgs),
    Restart(ClusterArgs),
    Reload(ClusterArgs),
    Init(ClusterInitArgs),
    Configure(ClusterConfigureArgs),
    /// Replace `pg_hba.conf`.
    Hba(ClusterHbaArgs),
}

/// `pg_ctl` operation requested by a lifecycle subcommand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Status,
    Start,
    Stop,
    Restart,
    Reload,
}

/// `NAME=VALUE` pair from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Assignment {
    pub(crate) name: String,
    pub(crate) value: String,
}

#[derive(Args)]
pub(crate) struct ConfCheckArgs {
    #[arg(required = true, value_parser = parse_assignment, help = "NAME=VALUE pairs")]
    pub(crate) assignments: Vec<Assignment>,
}

#[derive(Args)]
pub(crate) struct SettingsArgs {
    #[arg(value_parser = parse_assignment, help = "NAME=VALUE pairs")]
    pub(crate) assignments: Vec<Assignment>,
    #[arg(long, help = "JSON object of settings, applied before NAME=VALUE pairs")]
    pub(crate) json: Option<PathBuf>,
    #[arg(long, help = "Skip catalog validation")]
    pub(crate) unchecked: bool,
}

#[derive(Args)]
pub(crate) struct ConfApplyArgs {
    #[arg(short = 'f', long = "file")]
    pub(crate) file: PathBuf,
    #[arg(long, help = "Print the result without writing")]
    pub(crate) dry_run: bool,
    #[command(flatten)]
    pub(crate) settings: SettingsArgs,
}

#[derive(Args)]
pub(crate) struct ClusterArgs {
    #[arg(long, env = "PGDEPLOY_INSTALL_DIR")]
    pub(crate) install_dir: PathBuf,
    #[arg(long, env = "PGDEPLOY_DATA_DIR")]
    pub(crate) data_dir: PathBuf,
    #[arg(long, help = "Server log file passed to pg_ctl")]
    pub(crate) log_file: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct ClusterInitArgs {
    #[command(flatten)]
    pub(crate) cluster: ClusterArgs,
    #[arg(long, help = "Template encoding (defaults to UTF8)")]
    pub(crate) encoding: Option<String>,
    #[arg(long, conflicts_with = "encoding", help = "Use the server default encoding")]
    pub(crate) server_encoding: bool,
    #[arg(long)]
    pub(crate) locale: Option<String>,
    #[arg(long)]
    pub(crate) superuser: Option<String>,
    #[arg(long)]
    pub(crate) data_checksums: bool,
}

#[derive(Args)]
pub(crate) struct ClusterConfigureArgs {
    #[command(flatten)]
    pub(crate) cluster: ClusterArgs,
    #[command(flatten)]
    pub(crate) settings: SettingsArgs,
}

#[derive(Args)]
pub(crate) struct ClusterHbaArgs {
    #[command(flatten)]
    pub(crate) cluster: ClusterArgs,
    #[arg(long, help = "File whose content replaces pg_hba.conf")]
    pub(crate) source: PathBuf,
}

#[derive(Args)]
pub(crate) struct InstallArgs {
    #[arg(long, value_parser = parse_major_version, help = "Major version, e.g. 9.6 or 16")]
    pub(crate) version: PostgresMajorVersion,
    #[arg(long)]
    pub(crate) minor: u32,
    #[arg(long, value_parser = parse_platform, help = "os_arch, defaults to the current platform")]
    pub(crate) platform: Option<Platform>,
    #[arg(long, help = "Build variant suffix")]
    pub(crate) extra_version: Option<String>,
    #[arg(long, conflicts_with = "package_dir", help = "Package file")]
    pub(crate) package: Option<PathBuf>,
    #[arg(long, help = "Directory holding conventionally named packages")]
    pub(crate) package_dir: Option<PathBuf>,
    #[arg(long)]
    pub(crate) dest: PathBuf,
    #[arg(long)]
    pub(crate) with_share: bool,
    #[arg(long)]
    pub(crate) with_include: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn parse_assignment(input: &str) -> Result<Assignment, String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{input}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing setting name in '{input}'"));
    }
    Ok(Assignment {
        name: name.to_string(),
        value: value.trim().to_string(),
    })
}

fn parse_major_version(input: &str) -> Result<PostgresMajorVersion, String> {
    input
        .parse()
        .map_err(|_| format!("'{input}' is not a postgres major version"))
}

fn parse_platform(input: &str) -> Result<Platform, String> {
    input
        .parse()
        .map_err(|_| format!("'{input}' is not an os_arch platform"))
}
