//! Output renderers and formatting helpers for CLI commands.

use std::path::Path;

use pgdeploy_conffile::{MergeAction, MergeReport};
use pgdeploy_config::ConfigurationSet;
use pgdeploy_core::{ConfigAction, Installation, ServerStatus};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::context::{CliResult, json_failure};

#[derive(Serialize)]
struct SettingRow<'a> {
    name: &'a str,
    value: String,
    unit: &'a str,
    data_type: &'a str,
    needs_restart: bool,
}

pub(crate) fn render_settings(set: &ConfigurationSet, format: OutputFormat) -> CliResult<()> {
    let rows: Vec<SettingRow<'_>> = set
        .iter()
        .map(|(entry, value)| SettingRow {
            name: entry.name(),
            value: value.render(),
            unit: value.unit().suffix(),
            data_type: entry.data_type().as_str(),
            needs_restart: entry.needs_restart(),
        })
        .collect();
    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => {
            println!("{:<32} {:<16} {:<8} {:<8} RESTART", "NAME", "VALUE", "UNIT", "TYPE");
            for row in &rows {
                println!(
                    "{:<32} {:<16} {:<8} {:<8} {}",
                    row.name,
                    row.value,
                    row.unit,
                    row.data_type,
                    yes_no(row.needs_restart)
                );
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct MergeSummary<'a> {
    file: &'a Path,
    written: bool,
    requires_restart: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<ConfigAction>,
    report: &'a MergeReport,
}

pub(crate) fn render_merge(
    file: &Path,
    report: &MergeReport,
    written: bool,
    action: Option<ConfigAction>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&MergeSummary {
            file,
            written,
            requires_restart: report.requires_restart(),
            action,
            report,
        })?,
        OutputFormat::Table => {
            if report.is_unchanged() {
                println!("{}: already up to date", file.display());
            }
            for change in report.changes() {
                let previous = change
                    .previous()
                    .map(|previous| format!(" (was {previous})"))
                    .unwrap_or_default();
                println!(
                    "{:<14} {}={}{previous}",
                    action_label(change.action()),
                    change.property().name(),
                    change.value()
                );
            }
            if !written && !report.is_unchanged() {
                println!("--- {} (dry run)", file.display());
                print!("{}", report.render());
            }
            if let Some(action) = action {
                println!("server: {}", config_action_label(action));
            } else if report.requires_restart() {
                println!("restart required for changes to take effect");
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct StatusRow<'a> {
    data_dir: &'a Path,
    status: ServerStatus,
}

pub(crate) fn render_status(
    data_dir: &Path,
    status: ServerStatus,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&StatusRow { data_dir, status })?,
        OutputFormat::Table => println!("{}: {status}", data_dir.display()),
    }
    Ok(())
}

#[derive(Serialize)]
struct InstallationRow<'a> {
    path: &'a Path,
    pg_ctl: String,
    initdb: String,
}

pub(crate) fn render_installation(
    installation: &Installation,
    format: OutputFormat,
) -> CliResult<()> {
    let row = InstallationRow {
        path: installation.path(),
        pg_ctl: installation.pg_ctl().display().to_string(),
        initdb: installation.initdb().display().to_string(),
    };
    match format {
        OutputFormat::Json => print_json(&row)?,
        OutputFormat::Table => {
            println!("installed: {}", row.path.display());
            println!("pg_ctl: {}", row.pg_ctl);
            println!("initdb: {}", row.initdb);
        }
    }
    Ok(())
}

pub(crate) fn render_action(subject: &str, action: ConfigAction, format: OutputFormat) -> CliResult<()> {
    #[derive(Serialize)]
    struct ActionRow<'a> {
        subject: &'a str,
        action: ConfigAction,
    }
    match format {
        OutputFormat::Json => print_json(&ActionRow { subject, action })?,
        OutputFormat::Table => println!("{subject}: {}", config_action_label(action)),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|err| json_failure(&err))?;
    println!("{text}");
    Ok(())
}

const fn action_label(action: MergeAction) -> &'static str {
    match action {
        MergeAction::Appended => "appended",
        MergeAction::Uncommented => "uncommented",
        MergeAction::InsertedAfterComment => "inserted",
        MergeAction::Replaced => "replaced",
        MergeAction::Deduplicated => "deduplicated",
    }
}

const fn config_action_label(action: ConfigAction) -> &'static str {
    match action {
        ConfigAction::None => "no signal sent",
        ConfigAction::Reload => "reloaded",
        ConfigAction::Restart => "restarted",
    }
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_cover_every_action() {
        assert_eq!(action_label(MergeAction::InsertedAfterComment), "inserted");
        assert_eq!(config_action_label(ConfigAction::Restart), "restarted");
        assert_eq!(yes_no(true), "yes");
    }

    #[test]
    fn json_rendering_succeeds() {
        render_status(Path::new("/srv/pg"), ServerStatus::Active, OutputFormat::Json)
            .expect("status renders");
        render_action("pg_hba.conf", ConfigAction::Reload, OutputFormat::Table)
            .expect("action renders");
    }
}
