//! Ordering-preserving merge of a configuration set into file lines.
//!
//! # Design
//! - Entries are processed in set order against a working copy, so each entry
//!   sees the edits of the ones before it.
//! - For every entry the edits are first planned against the current indices
//!   and then applied in a single rebuild pass; no index is adjusted mid-edit.
//! - Only the last active and the last commented declaration of a key are
//!   authoritative. Earlier active duplicates are dropped, leaving exactly one
//!   active declaration per merged key.
//! - When a value changes, the old declaration is kept as a single `#key=old`
//!   history line holding the full old value, trailing comment included, and
//!   any other commented declaration of the key is dropped.
//! - An active value that already matches is left alone even when earlier
//!   active duplicates are removed around it.
//! - Lines that do not declare a merged key are never rewritten or reordered.

use std::collections::HashMap;

use pgdeploy_config::{ConfigurationSet, PropertyEntry};
use serde::Serialize;
use tracing::debug;

use crate::line::ConfLine;

/// What the merge did for one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeAction {
    /// No declaration existed; a new line was appended.
    Appended,
    /// A commented declaration with the same value was re-enabled.
    Uncommented,
    /// A new declaration was inserted after a commented one holding another value.
    InsertedAfterComment,
    /// The active declaration was commented out and followed by the new value.
    Replaced,
    /// The value was already active; shadowed earlier duplicates were dropped.
    Deduplicated,
}

impl MergeAction {
    /// Whether the effective value of the setting changed.
    #[must_use]
    pub const fn changes_value(self) -> bool {
        !matches!(self, Self::Deduplicated)
    }
}

/// A property whose lines were edited by the merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedChange {
    property: PropertyEntry,
    action: MergeAction,
    value: String,
    previous: Option<String>,
}

impl AppliedChange {
    /// Catalog entry of the edited setting.
    #[must_use]
    pub const fn property(&self) -> &PropertyEntry {
        &self.property
    }

    /// Kind of edit.
    #[must_use]
    pub const fn action(&self) -> MergeAction {
        self.action
    }

    /// Value now active.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Previously active value as kept in the history line, inline comment
    /// included, when one was replaced.
    #[must_use]
    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }
}

/// Result of [`merge_lines`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    lines: Vec<ConfLine>,
    changes: Vec<AppliedChange>,
}

impl MergeReport {
    /// Resulting lines.
    #[must_use]
    pub fn lines(&self) -> &[ConfLine] {
        &self.lines
    }

    /// Resulting line texts.
    #[must_use]
    pub fn rendered_lines(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.raw().to_string()).collect()
    }

    /// Resulting file content, newline-terminated.
    #[must_use]
    pub fn render(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line.raw());
            text.push('\n');
        }
        text
    }

    /// Properties whose lines were edited, in set order.
    #[must_use]
    pub fn changes(&self) -> &[AppliedChange] {
        &self.changes
    }

    /// Whether the merge left the input as it was.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }

    /// Whether any setting whose value changed needs a server restart.
    #[must_use]
    pub fn requires_restart(&self) -> bool {
        self.changes
            .iter()
            .any(|change| change.action.changes_value() && change.property.needs_restart())
    }

    /// Whether any setting's effective value changed.
    #[must_use]
    pub fn changes_values(&self) -> bool {
        self.changes
            .iter()
            .any(|change| change.action.changes_value())
    }
}

/// Merge `set` into `lines`.
///
/// Never fails: lines that cannot be classified pass through untouched.
#[must_use]
pub fn merge_lines<S: AsRef<str>>(lines: &[S], set: &ConfigurationSet) -> MergeReport {
    let mut working: Vec<ConfLine> = lines
        .iter()
        .map(|line| ConfLine::parse(line.as_ref()))
        .collect();
    let mut changes = Vec::new();

    for (entry, value) in set.iter() {
        let rendered = value.render();
        let (plan, outcome) = plan_entry(&working, entry.name(), &rendered);
        if let Some((action, previous)) = outcome {
            debug!(
                property = entry.name(),
                value = %rendered,
                action = ?action,
                "merged configuration property"
            );
            changes.push(AppliedChange {
                property: entry.clone(),
                action,
                value: rendered,
                previous,
            });
        }
        working = plan.apply(working);
    }

    MergeReport {
        lines: working,
        changes,
    }
}

type Outcome = Option<(MergeAction, Option<String>)>;

fn plan_entry(lines: &[ConfLine], key: &str, rendered: &str) -> (EditPlan, Outcome) {
    let active: Vec<usize> = positions(lines, |line| line.active_key() == Some(key));
    let commented: Vec<usize> = positions(lines, |line| line.commented_key() == Some(key));
    let mut plan = EditPlan::default();

    let outcome = match (active.split_last(), commented.last()) {
        (None, None) => {
            plan.append = Some(ConfLine::active(key, rendered));
            Some((MergeAction::Appended, None))
        }
        (None, Some(&comment)) => {
            if lines[comment].declares(rendered) {
                plan.replace.insert(comment, ConfLine::active(key, rendered));
                Some((MergeAction::Uncommented, None))
            } else {
                plan.insert_after
                    .insert(comment, ConfLine::active(key, rendered));
                Some((MergeAction::InsertedAfterComment, None))
            }
        }
        (Some((&last, shadowed)), _) => {
            plan.remove.extend_from_slice(shadowed);
            if lines[last].declares(rendered) {
                (!shadowed.is_empty()).then_some((MergeAction::Deduplicated, None))
            } else {
                let previous = lines[last].value().unwrap_or_default().to_string();
                plan.replace.insert(last, ConfLine::commented(key, &previous));
                plan.insert_after.insert(last, ConfLine::active(key, rendered));
                plan.remove.extend_from_slice(&commented);
                Some((MergeAction::Replaced, Some(previous)))
            }
        }
    };

    (plan, outcome)
}

fn positions(lines: &[ConfLine], predicate: impl Fn(&ConfLine) -> bool) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| predicate(line))
        .map(|(index, _)| index)
        .collect()
}

/// Edits addressed by indices of the lines they were planned against.
#[derive(Default)]
struct EditPlan {
    replace: HashMap<usize, ConfLine>,
    insert_after: HashMap<usize, ConfLine>,
    remove: Vec<usize>,
    append: Option<ConfLine>,
}

impl EditPlan {
    fn apply(mut self, lines: Vec<ConfLine>) -> Vec<ConfLine> {
        let mut rebuilt = Vec::with_capacity(lines.len() + 1);
        for (index, line) in lines.into_iter().enumerate() {
            if !self.remove.contains(&index) {
                rebuilt.push(self.replace.remove(&index).unwrap_or(line));
            }
            if let Some(inserted) = self.insert_after.remove(&index) {
                rebuilt.push(inserted);
            }
        }
        rebuilt.extend(self.append);
        rebuilt
    }
}

#[cfg(test)]
mod tests {
    use pgdeploy_config::{ConfigurationSetBuilder, DataType, TypedValue, UnitGroup};

    use super::*;

    fn set_of(pairs: &[(&str, TypedValue)]) -> ConfigurationSet {
        let catalog = |_: &str| -> Option<PropertyEntry> { None };
        pairs
            .iter()
            .fold(ConfigurationSetBuilder::new(&catalog), |builder, (name, value)| {
                builder.with_value_unchecked(name, value.clone())
            })
            .build()
    }

    fn merged(lines: &[&str], set: &ConfigurationSet) -> Vec<String> {
        merge_lines(lines, set).rendered_lines()
    }

    #[test]
    fn changed_value_keeps_history() {
        let set = set_of(&[("prop", TypedValue::plain("value"))]);
        assert_eq!(merged(&["prop=234"], &set), ["#prop=234", "prop=value"]);
    }

    #[test]
    fn unchanged_value_is_a_no_op() {
        let set = set_of(&[("prop", TypedValue::plain(234))]);
        let lines = ["#prop=1", "prop1=val1", "prop=234"];
        let report = merge_lines(&lines, &set);
        assert_eq!(report.rendered_lines(), lines);
        assert!(report.is_unchanged());
    }

    #[test]
    fn missing_key_is_appended() {
        let set = set_of(&[("prop", TypedValue::mb(5.3))]);
        assert_eq!(
            merged(&["other=1", ""], &set),
            ["other=1", "", "prop=5.3MB"]
        );
    }

    #[test]
    fn commented_same_value_is_uncommented() {
        let set = set_of(&[("work_mem", TypedValue::mb(4))]);
        let report = merge_lines(&["a=1", "#work_mem = 4MB   # min 64kB", "b=2"], &set);
        assert_eq!(report.rendered_lines(), ["a=1", "work_mem=4MB", "b=2"]);
        assert_eq!(report.changes()[0].action(), MergeAction::Uncommented);
    }

    #[test]
    fn commented_other_value_gets_a_follower() {
        let set = set_of(&[("work_mem", TypedValue::mb(64))]);
        assert_eq!(
            merged(&["#work_mem = 4MB", "b=2"], &set),
            ["#work_mem = 4MB", "work_mem=64MB", "b=2"]
        );
    }

    #[test]
    fn stale_comment_before_active_is_dropped() {
        let set = set_of(&[("prop", TypedValue::plain(3))]);
        assert_eq!(
            merged(&["#prop=1", "x=0", "prop=2", "y=0"], &set),
            ["x=0", "#prop=2", "prop=3", "y=0"]
        );
    }

    #[test]
    fn stale_comment_after_active_is_dropped() {
        let set = set_of(&[("prop", TypedValue::plain(3))]);
        assert_eq!(
            merged(&["prop=2", "x=0", "#prop=1", "y=0"], &set),
            ["#prop=2", "prop=3", "x=0", "y=0"]
        );
    }

    #[test]
    fn shadowed_active_duplicates_are_removed() {
        let set = set_of(&[("prop", TypedValue::plain(2))]);
        let report = merge_lines(&["prop=1", "x=0", "prop=2"], &set);
        assert_eq!(report.rendered_lines(), ["x=0", "prop=2"]);
        assert_eq!(report.changes()[0].action(), MergeAction::Deduplicated);
        assert!(!report.changes_values());
    }

    #[test]
    fn later_entries_see_earlier_edits() {
        let set = set_of(&[
            ("a", TypedValue::plain(1)),
            ("b", TypedValue::plain(2)),
            ("a", TypedValue::plain(3)),
        ]);
        assert_eq!(merged(&["# header"], &set), ["# header", "a=3", "b=2"]);

        let set = set_of(&[("a", TypedValue::plain(1)), ("b", TypedValue::plain(2))]);
        assert_eq!(
            merged(&["b=0", "a=0"], &set),
            ["#b=0", "b=2", "#a=0", "a=1"]
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let set = set_of(&[
            ("shared_buffers", TypedValue::mb(256)),
            ("work_mem", TypedValue::mb(8)),
            ("listen_addresses", TypedValue::plain("'*'")),
            ("new_setting", TypedValue::plain(true)),
        ]);
        let input = [
            "shared_buffers = 128MB  # min 128kB",
            "#work_mem = 4MB",
            "#work_mem = 2MB",
            "#listen_addresses = 'localhost'",
            "",
            "# tail",
        ];
        let first = merged(&input, &set);
        let second = merge_lines(&first, &set);
        assert!(second.is_unchanged());
        assert_eq!(second.rendered_lines(), first);
    }

    #[test]
    fn restart_follows_changed_entries_only() {
        let catalog = |name: &str| {
            Some(PropertyEntry::with_group(
                name,
                name == "port",
                DataType::Integer,
                UnitGroup::None,
            ))
        };
        let set = ConfigurationSetBuilder::new(&catalog)
            .with_property_unchecked("port", 5432)
            .with_property_unchecked("work_mem", 1)
            .build();
        let report = merge_lines(&["port = 5432", "work_mem = 0"], &set);
        assert!(!report.requires_restart());
        assert!(report.changes_values());

        let report = merge_lines(&["port = 5433"], &set);
        assert!(report.requires_restart());
        assert_eq!(report.changes()[0].previous(), Some("5433"));
    }

    #[test]
    fn render_terminates_lines() {
        let set = set_of(&[("a", TypedValue::plain(1))]);
        assert_eq!(merge_lines(&["# x"], &set).render(), "# x\na=1\n");
        assert_eq!(merge_lines::<&str>(&[], &ConfigurationSet::default()).render(), "");
    }
}
