use pgdeploy_conffile::{apply_to_file, plan_for_file};
use pgdeploy_config::{ConfigurationSet, ConfigurationSetBuilder, parse_property_map};

use crate::cli::{ConfApplyArgs, ConfCheckArgs, SettingsArgs};
use crate::context::{AppContext, CliError, CliResult, read_text};
use crate::output::{render_merge, render_settings};

pub(crate) fn handle_conf_check(ctx: &AppContext, args: &ConfCheckArgs) -> CliResult<()> {
    let pairs = args
        .assignments
        .iter()
        .map(|assignment| (assignment.name.as_str(), assignment.value.as_str()));
    let set = ConfigurationSetBuilder::new(&ctx.catalog)
        .with_properties(pairs)?
        .build();
    render_settings(&set, ctx.output)
}

pub(crate) fn handle_conf_apply(ctx: &AppContext, args: &ConfApplyArgs) -> CliResult<()> {
    let set = build_settings(ConfigurationSetBuilder::new(&ctx.catalog), &args.settings)?;
    let failure = |err| CliError::failure(anyhow::Error::new(err));
    let report = if args.dry_run {
        plan_for_file(&args.file, &set).map_err(failure)?
    } else {
        apply_to_file(&args.file, &set).map_err(failure)?
    };
    render_merge(&args.file, &report, !args.dry_run, None, ctx.output)
}

/// Collect `--json` members then `NAME=VALUE` pairs into one set.
pub(crate) fn build_settings(
    builder: ConfigurationSetBuilder<'_>,
    settings: &SettingsArgs,
) -> CliResult<ConfigurationSet> {
    let mut builder = builder;
    if let Some(path) = &settings.json {
        let map = parse_property_map(&read_text(path)?)?;
        builder = if settings.unchecked {
            builder.with_json_map_unchecked(&map)?
        } else {
            builder.with_json_map(&map)?
        };
    }

    let pairs = settings
        .assignments
        .iter()
        .map(|assignment| (assignment.name.as_str(), assignment.value.as_str()));
    builder = if settings.unchecked {
        builder.with_properties_unchecked(pairs)
    } else {
        builder.with_properties(pairs)?
    };

    let set = builder.build();
    if set.is_empty() {
        return Err(CliError::validation(
            "no settings given (pass NAME=VALUE pairs or --json FILE)",
        ));
    }
    Ok(set)
}
