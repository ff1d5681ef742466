use pgdeploy_config::{
    ConfigError, ConfigurationSetBuilder, DataType, PropertyCatalog, PropertyEntry, Scalar,
    TableCatalog, TypedValue, Unit, UnitGroup, parse_property_map, parse_value,
};
use pgdeploy_test_support::fixtures::CATALOG_TABLE;

fn fixture_catalog() -> anyhow::Result<TableCatalog> {
    Ok(TableCatalog::parse(CATALOG_TABLE)?)
}

#[test]
fn integer_bytes_accept_terabytes() -> anyhow::Result<()> {
    let entry = PropertyEntry::with_group("prop", false, DataType::Integer, UnitGroup::Bytes);
    let value = parse_value(&Scalar::from("9TB"), &entry)?;
    assert_eq!(value, TypedValue::new(9, Unit::Tb));
    Ok(())
}

#[test]
fn unitless_real_rejects_terabytes() {
    let entry = PropertyEntry::with_group("prop", false, DataType::Real, UnitGroup::None);
    let result = parse_value(&Scalar::from("9.5TB"), &entry);
    assert!(matches!(result, Err(ConfigError::UnitNotAvailable { .. })));
}

#[test]
fn boolean_on_is_true() -> anyhow::Result<()> {
    let entry = PropertyEntry::with_group("prop", false, DataType::Boolean, UnitGroup::None);
    assert_eq!(
        parse_value(&Scalar::from("on"), &entry)?,
        TypedValue::new(true, Unit::None)
    );
    Ok(())
}

#[test]
fn catalog_backed_builder_validates_every_assignment() -> anyhow::Result<()> {
    let catalog = fixture_catalog()?;
    let set = ConfigurationSetBuilder::new(&catalog)
        .with_property("shared_buffers", "256MB")?
        .with_property("checkpoint_timeout", "15min")?
        .with_property("log_min_duration_statement", "250ms")?
        .with_property("checkpoint_completion_target", 0.9)?
        .with_property("fsync", "off")?
        .build();

    assert_eq!(set.len(), 5);
    assert_eq!(set.get("shared_buffers"), Some(&TypedValue::mb(256)));
    assert_eq!(set.get("checkpoint_timeout"), Some(&TypedValue::min(15)));
    assert_eq!(set.get("log_min_duration_statement"), Some(&TypedValue::ms(250)));
    assert_eq!(
        set.get("checkpoint_completion_target"),
        Some(&TypedValue::plain(0.9))
    );
    assert!(set.requires_restart());

    let rendered: Vec<String> = set.iter().map(|(_, value)| value.render()).collect();
    assert_eq!(rendered, ["256MB", "15min", "250ms", "0.9", "false"]);
    Ok(())
}

#[test]
fn reloadable_only_sets_do_not_require_restart() -> anyhow::Result<()> {
    let catalog = fixture_catalog()?;
    let set = ConfigurationSetBuilder::new(&catalog)
        .with_properties([("work_mem", "64MB"), ("checkpoint_timeout", "10min")])?
        .build();
    assert!(!set.requires_restart());
    Ok(())
}

#[test]
fn errors_name_the_offending_property() -> anyhow::Result<()> {
    let catalog = fixture_catalog()?;
    let err = ConfigurationSetBuilder::new(&catalog)
        .with_property("max_connections", "many")
        .err()
        .ok_or_else(|| anyhow::anyhow!("expected a type error"))?;
    let message = err.to_string();
    assert!(message.contains("max_connections"), "{message}");
    assert!(message.contains("many"), "{message}");
    Ok(())
}

#[test]
fn json_property_maps_feed_the_builder() -> anyhow::Result<()> {
    let catalog = fixture_catalog()?;
    let map = parse_property_map(r#"{"work_mem": "8MB", "max_connections": 300, "wal_level": "logical"}"#)?;
    let set = ConfigurationSetBuilder::new(&catalog)
        .with_json_map(&map)?
        .build();
    let names: Vec<&str> = set.iter().map(|(entry, _)| entry.name()).collect();
    assert_eq!(names, ["work_mem", "max_connections", "wal_level"]);
    assert_eq!(set.get("max_connections"), Some(&TypedValue::plain(300)));
    Ok(())
}

#[test]
fn rendered_values_reparse_against_the_same_entry() -> anyhow::Result<()> {
    let catalog = TableCatalog::bundled()?;
    let cases = [
        ("shared_buffers", TypedValue::mb(5)),
        ("work_mem", TypedValue::kb(640)),
        ("checkpoint_timeout", TypedValue::hours(1)),
        ("statement_timeout", TypedValue::sec(30)),
        ("autovacuum_naptime", TypedValue::days(1)),
        ("max_wal_size", TypedValue::gb(2)),
        ("random_page_cost", TypedValue::plain(1.1)),
        ("autovacuum", TypedValue::plain(true)),
        ("wal_level", TypedValue::plain("replica")),
    ];
    for (name, value) in cases {
        let entry = catalog
            .lookup(name)
            .ok_or_else(|| anyhow::anyhow!("{name} missing from bundled catalog"))?;
        let reparsed = parse_value(&Scalar::from(value.render()), &entry)?;
        assert_eq!(reparsed, value, "{name}");
    }
    Ok(())
}

#[test]
fn catalog_files_load_from_disk() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("props.csv");
    std::fs::write(&path, CATALOG_TABLE)?;
    let catalog = TableCatalog::load(&path)?;
    assert!(catalog.lookup("wal_level").is_some());

    let missing = TableCatalog::load(&temp.path().join("absent.csv"));
    assert!(matches!(missing, Err(ConfigError::Io { .. })));
    Ok(())
}
