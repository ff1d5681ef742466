use pgdeploy_config::{ConfigurationSet, ConfigurationSetBuilder, TableCatalog, TypedValue};
use pgdeploy_conffile::{MergeAction, apply_to_file, merge_lines, overwrite, read_lines};
use pgdeploy_test_support::fixtures::{CATALOG_TABLE, PG_HBA_CONF, POSTGRESQL_CONF, lines};

fn prop_set(value: &str) -> ConfigurationSet {
    let catalog = TableCatalog::default();
    ConfigurationSetBuilder::new(&catalog)
        .with_property_unchecked("prop", value)
        .build()
}

fn merge_text(input: &str, set: &ConfigurationSet) -> String {
    let input: Vec<&str> = input.split('\n').collect();
    merge_lines(&input, set).rendered_lines().join("\n")
}

#[test]
fn decision_table_cases() {
    let set = prop_set("value");
    let cases = [
        // absent
        ("", "\nprop=value"),
        ("prop1=234", "prop1=234\nprop=value"),
        // commented
        ("#prop=value", "prop=value"),
        ("# prop =value", "prop=value"),
        ("# prop = value ", "prop=value"),
        ("#prop=other", "#prop=other\nprop=value"),
        // active, unchanged
        ("prop=value", "prop=value"),
        (" prop = value ", " prop = value "),
        // active, changed
        ("prop=234", "#prop=234\nprop=value"),
        (" prop = 234 ", "#prop=234\nprop=value"),
        // positions
        ("#prop=1\n\nprop=234", "\n#prop=234\nprop=value"),
        ("#prop=1\nprop1=val1\nprop=234", "prop1=val1\n#prop=234\nprop=value"),
        ("prop=234\n\n#prop=1", "#prop=234\nprop=value\n"),
    ];
    for (input, expected) in cases {
        assert_eq!(merge_text(input, &set), expected, "input {input:?}");
    }
}

#[test]
fn unchanged_value_leaves_every_line_in_place() {
    let set = prop_set("234");
    let input = "#prop=1\nprop1=val1\nprop=234";
    assert_eq!(merge_text(input, &set), input);
}

#[test]
fn realistic_file_keeps_unrelated_lines() -> anyhow::Result<()> {
    let catalog = TableCatalog::parse(CATALOG_TABLE)?;
    let set = ConfigurationSetBuilder::new(&catalog)
        .with_property("max_connections", "300")?
        .with_property("work_mem", "16MB")?
        .with_property("fsync", "on")?
        .with_property("checkpoint_timeout", "5min")?
        .with_property("wal_level", "logical")?
        .build();

    let input = lines(POSTGRESQL_CONF);
    let report = merge_lines(&input, &set);
    let output = report.rendered_lines();

    for untouched in input.iter().filter(|line| {
        !["max_connections", "#work_mem", "#fsync", "#checkpoint_timeout"]
            .iter()
            .any(|key| line.starts_with(key))
    }) {
        assert!(output.contains(untouched), "lost line {untouched:?}");
    }

    let position = |needle: &str| {
        output
            .iter()
            .position(|line| line.as_str() == needle)
            .unwrap_or_else(|| panic!("missing {needle:?} in {output:#?}"))
    };
    assert_eq!(
        position("#max_connections=100\t\t\t# (change requires restart)") + 1,
        position("max_connections=300")
    );
    assert_eq!(position("#work_mem = 4MB\t\t\t\t# min 64kB") + 1, position("work_mem=16MB"));
    assert!(output.iter().any(|line| line == "fsync=true"));
    assert_eq!(output.last().map(String::as_str), Some("wal_level=logical"));

    let actions: Vec<MergeAction> = report.changes().iter().map(|change| change.action()).collect();
    assert_eq!(
        actions,
        [
            MergeAction::Replaced,
            MergeAction::InsertedAfterComment,
            MergeAction::InsertedAfterComment,
            MergeAction::Uncommented,
            MergeAction::Appended,
        ]
    );
    assert!(report.requires_restart());
    Ok(())
}

#[test]
fn every_key_has_exactly_one_active_line() -> anyhow::Result<()> {
    let set = prop_set("3");
    let inputs = [
        "prop=1\nprop=2\n#prop=0",
        "#prop=3\n#prop=2\nprop=1\nprop=1",
        "x=1\n#prop = 3\n# prop = 4",
        "",
    ];
    for input in inputs {
        let output = merge_text(input, &set);
        let active = output.lines().filter(|line| line.starts_with("prop=")).count();
        assert_eq!(active, 1, "{output}");
    }
    Ok(())
}

#[test]
fn history_keeps_only_the_previous_value() {
    let set = prop_set("B");
    let output = merge_text("#prop=Z\nprop=A\n#prop=Y", &set);
    assert_eq!(output, "#prop=A\nprop=B");
}

#[test]
fn unquoted_hash_value_is_stable_across_passes() {
    let set = prop_set("a#b");
    let empty: [&str; 0] = [];
    let first = merge_lines(&empty, &set).rendered_lines();
    assert_eq!(first, ["prop=a#b"]);

    let second = merge_lines(&first, &set);
    assert!(second.is_unchanged());
    assert_eq!(second.rendered_lines(), first);

    let replaced = merge_lines(&first, &prop_set("c"));
    assert_eq!(replaced.rendered_lines(), ["#prop=a#b", "prop=c"]);
    assert_eq!(replaced.changes()[0].previous(), Some("a#b"));
}

#[test]
fn history_keeps_the_inline_comment() {
    let set = prop_set("256MB");
    let output = merge_text("shared_buffers = 1\nprop = 128MB  # min 128kB", &set);
    assert_eq!(output, "shared_buffers = 1\n#prop=128MB  # min 128kB\nprop=256MB");
    assert_eq!(merge_text(&output, &set), output);
}

#[test]
fn matching_active_value_survives_duplicate_removal() {
    let set = prop_set("2");
    let report = merge_lines(&["prop=1", "#prop=0", " prop = 2  # current"], &set);
    assert_eq!(report.rendered_lines(), ["#prop=0", " prop = 2  # current"]);
    assert_eq!(report.changes()[0].action(), MergeAction::Deduplicated);
    assert!(!report.changes_values());
}

#[test]
fn second_pass_is_a_fixed_point() -> anyhow::Result<()> {
    let catalog = TableCatalog::parse(CATALOG_TABLE)?;
    let set = ConfigurationSetBuilder::new(&catalog)
        .with_properties([
            ("shared_buffers", "1GB"),
            ("work_mem", "4MB"),
            ("checkpoint_completion_target", "0.7"),
        ])?
        .build();
    let first = merge_lines(&lines(POSTGRESQL_CONF), &set).rendered_lines();
    let second = merge_lines(&first, &set);
    assert!(second.is_unchanged());
    assert_eq!(second.rendered_lines(), first);
    Ok(())
}

#[test]
fn files_are_rewritten_through_the_store() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let conf = temp.path().join("postgresql.conf");
    std::fs::write(&conf, POSTGRESQL_CONF)?;

    let catalog = TableCatalog::parse(CATALOG_TABLE)?;
    let set = ConfigurationSetBuilder::new(&catalog)
        .with_value("shared_buffers", TypedValue::mb(512))?
        .build();
    let report = apply_to_file(&conf, &set)?;
    assert_eq!(report.changes().len(), 1);
    assert_eq!(report.changes()[0].previous(), Some("128MB\t\t\t# min 128kB"));

    let written = read_lines(&conf)?;
    assert!(written.iter().any(|line| line == "shared_buffers=512MB"));
    assert!(written.iter().any(|line| line == "#shared_buffers=128MB\t\t\t# min 128kB"));
    assert_eq!(written.len(), lines(POSTGRESQL_CONF).len() + 1);

    let hba = temp.path().join("pg_hba.conf");
    overwrite(&hba, PG_HBA_CONF)?;
    assert_eq!(std::fs::read_to_string(&hba)?, PG_HBA_CONF);
    Ok(())
}
