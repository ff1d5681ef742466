use std::path::Path;

use pgdeploy_core::{InstallOptions, Platform, SupplierFeatures, ZipSupplier};

use crate::cli::InstallArgs;
use crate::context::{AppContext, CliError, CliResult};
use crate::output::render_installation;

pub(crate) fn handle_install(ctx: &AppContext, args: &InstallArgs) -> CliResult<()> {
    let features = requested_features(args);
    let supplier = match (&args.package, &args.package_dir) {
        (Some(package), _) => ZipSupplier::new(features, package),
        (None, Some(directory)) => ZipSupplier::in_directory(features, directory),
        (None, None) => ZipSupplier::in_directory(features, Path::new(".")),
    };
    if !supplier.package().is_file() {
        return Err(CliError::validation(format!(
            "package {} does not exist",
            supplier.package().display()
        )));
    }

    let installation = ctx
        .deploy
        .install(&supplier, install_options(args), &args.dest)?;
    render_installation(&installation, ctx.output)
}

fn requested_features(args: &InstallArgs) -> SupplierFeatures {
    let platform = args.platform.clone().unwrap_or_else(Platform::current);
    let features = SupplierFeatures::new(args.version, args.minor, platform);
    match &args.extra_version {
        Some(extra) => features.with_extra_version(extra.as_str()),
        None => features,
    }
}

const fn install_options(args: &InstallArgs) -> InstallOptions {
    let mut options = InstallOptions::binaries();
    if args.with_share {
        options = options.with_share();
    }
    if args.with_include {
        options = options.with_include();
    }
    options
}
