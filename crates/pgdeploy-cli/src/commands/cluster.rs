use pgdeploy_core::{Cluster, ClusterCreationOptions};
use tracing::info;

use crate::cli::{ClusterArgs, ClusterConfigureArgs, ClusterHbaArgs, ClusterInitArgs, Lifecycle};
use crate::commands::conf::build_settings;
use crate::context::{AppContext, CliResult};
use crate::output::{render_action, render_merge, render_status};

pub(crate) fn handle_cluster_lifecycle(
    ctx: &AppContext,
    args: &ClusterArgs,
    command: Lifecycle,
) -> CliResult<()> {
    let cluster = open_cluster(ctx, args)?;
    let log = args.log_file.as_deref();
    match command {
        Lifecycle::Status => {}
        Lifecycle::Start => cluster.start(log)?,
        Lifecycle::Stop => cluster.stop(log)?,
        Lifecycle::Restart => cluster.restart(log)?,
        Lifecycle::Reload => cluster.reload(log)?,
    }
    render_status(cluster.data_dir(), cluster.status(log), ctx.output)
}

pub(crate) fn handle_cluster_init(ctx: &AppContext, args: &ClusterInitArgs) -> CliResult<()> {
    let installation = ctx.deploy.retrieve_installation(&args.cluster.install_dir)?;
    let cluster = installation.create_cluster(&args.cluster.data_dir, &creation_options(args))?;
    info!(data_dir = %cluster.data_dir().display(), "cluster initialised");
    render_status(
        cluster.data_dir(),
        cluster.status(args.cluster.log_file.as_deref()),
        ctx.output,
    )
}

pub(crate) fn handle_cluster_configure(
    ctx: &AppContext,
    args: &ClusterConfigureArgs,
) -> CliResult<()> {
    let cluster = open_cluster(ctx, &args.cluster)?;
    let set = build_settings(cluster.config_builder(), &args.settings)?;
    let outcome = cluster.apply_config(&set, args.cluster.log_file.as_deref())?;
    render_merge(
        &cluster.postgresql_conf(),
        outcome.report(),
        true,
        Some(outcome.action()),
        ctx.output,
    )
}

pub(crate) fn handle_cluster_hba(ctx: &AppContext, args: &ClusterHbaArgs) -> CliResult<()> {
    let cluster = open_cluster(ctx, &args.cluster)?;
    let action = cluster.set_pg_hba_from_file(&args.source, args.cluster.log_file.as_deref())?;
    render_action("pg_hba.conf", action, ctx.output)
}

fn open_cluster(ctx: &AppContext, args: &ClusterArgs) -> CliResult<Cluster> {
    Ok(ctx.deploy.retrieve_cluster(&args.data_dir, &args.install_dir)?)
}

fn creation_options(args: &ClusterInitArgs) -> ClusterCreationOptions {
    let mut options = ClusterCreationOptions::default().with_data_checksums(args.data_checksums);
    if args.server_encoding {
        options = options.with_server_default_encoding();
    } else if let Some(encoding) = &args.encoding {
        options = options.with_encoding(encoding.as_str());
    }
    if let Some(locale) = &args.locale {
        options = options.with_locale(locale.as_str());
    }
    if let Some(superuser) = &args.superuser {
        options = options.with_superuser(superuser.as_str());
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn init_args() -> ClusterInitArgs {
        ClusterInitArgs {
            cluster: ClusterArgs {
                install_dir: PathBuf::from("/opt/pg"),
                data_dir: PathBuf::from("/srv/pg"),
                log_file: None,
            },
            encoding: None,
            server_encoding: false,
            locale: None,
            superuser: None,
            data_checksums: false,
        }
    }

    #[test]
    fn creation_options_follow_flags() {
        assert_eq!(creation_options(&init_args()).to_args(), ["-E", "UTF8"]);

        let mut args = init_args();
        args.server_encoding = true;
        args.superuser = Some("admin".to_string());
        args.data_checksums = true;
        assert_eq!(creation_options(&args).to_args(), ["-U", "admin", "-k"]);

        let mut args = init_args();
        args.encoding = Some("LATIN1".to_string());
        args.locale = Some("C".to_string());
        assert_eq!(
            creation_options(&args).to_args(),
            ["-E", "LATIN1", "--locale", "C"]
        );
    }
}
