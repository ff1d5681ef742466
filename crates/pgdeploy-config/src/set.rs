//! Two-phase construction of immutable configuration sets.
//!
//! # Design
//! - [`ConfigurationSetBuilder`] accumulates assignments and is consumed by
//!   [`ConfigurationSetBuilder::build`]; a builder is single-use.
//! - The resulting [`ConfigurationSet`] iterates in first-insertion order.
//!   Overwriting an entry replaces its value in place, so the position of the
//!   first assignment wins. This order drives where the merge engine appends
//!   new lines.
//! - Strict operations resolve every name through the catalog and validate;
//!   unchecked operations fall back to [`PropertyEntry::placeholder`] and skip
//!   validation.

use serde_json::{Map, Value};
use tracing::debug;

use crate::catalog::PropertyCatalog;
use crate::error::{ConfigError, ConfigResult};
use crate::parse::{parse_value, validate_value};
use crate::property::PropertyEntry;
use crate::unit::Unit;
use crate::value::{Scalar, TypedValue};

/// Mutable accumulator producing a [`ConfigurationSet`].
pub struct ConfigurationSetBuilder<'a> {
    catalog: &'a dyn PropertyCatalog,
    assignments: Vec<(PropertyEntry, TypedValue)>,
}

impl<'a> ConfigurationSetBuilder<'a> {
    /// Start an empty builder resolving names through `catalog`.
    #[must_use]
    pub fn new(catalog: &'a dyn PropertyCatalog) -> Self {
        Self {
            catalog,
            assignments: Vec::new(),
        }
    }

    /// Parse `raw` against the catalog entry for `name` and record it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PropertyNotFound`] for unknown names and any
    /// error from [`parse_value`].
    pub fn with_property(self, name: &str, raw: impl Into<Scalar>) -> ConfigResult<Self> {
        let entry = self.resolve(name)?;
        let value = parse_value(&raw.into(), &entry)?;
        Ok(self.assign(entry, value))
    }

    /// Validate an already typed value against the catalog entry for `name` and record it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PropertyNotFound`] for unknown names and any
    /// error from [`validate_value`].
    pub fn with_value(self, name: &str, value: TypedValue) -> ConfigResult<Self> {
        let entry = self.resolve(name)?;
        validate_value(&value, &entry)?;
        Ok(self.assign(entry, value))
    }

    /// Apply [`Self::with_property`] to each pair in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing pair and returns its error.
    pub fn with_properties<I, K, V>(self, pairs: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        pairs
            .into_iter()
            .try_fold(self, |builder, (name, raw)| {
                builder.with_property(name.as_ref(), raw)
            })
    }

    /// Apply [`Self::with_property`] to each member of a JSON object, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] for `null` members,
    /// [`ConfigError::UnsupportedValue`] for nested structures and any error of
    /// [`Self::with_property`].
    pub fn with_json_map(self, map: &Map<String, Value>) -> ConfigResult<Self> {
        let pairs = json_pairs(map)?;
        self.with_properties(pairs)
    }

    /// Record `raw` for `name` without validation.
    ///
    /// Known names keep their catalog entry. Unknown names get a placeholder
    /// entry. Text is stored verbatim without a unit; native values are
    /// stored without a unit too.
    #[must_use]
    pub fn with_property_unchecked(self, name: &str, raw: impl Into<Scalar>) -> Self {
        let entry = self.resolve_or_placeholder(name);
        self.assign(entry, TypedValue::new(raw, Unit::None))
    }

    /// Record an already typed value for `name` without validation.
    #[must_use]
    pub fn with_value_unchecked(self, name: &str, value: TypedValue) -> Self {
        let entry = self.resolve_or_placeholder(name);
        self.assign(entry, value)
    }

    /// Apply [`Self::with_property_unchecked`] to each pair in order.
    #[must_use]
    pub fn with_properties_unchecked<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        pairs.into_iter().fold(self, |builder, (name, raw)| {
            builder.with_property_unchecked(name.as_ref(), raw)
        })
    }

    /// Apply [`Self::with_property_unchecked`] to each member of a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] for `null` members and
    /// [`ConfigError::UnsupportedValue`] for nested structures.
    pub fn with_json_map_unchecked(self, map: &Map<String, Value>) -> ConfigResult<Self> {
        let pairs = json_pairs(map)?;
        Ok(self.with_properties_unchecked(pairs))
    }

    /// Freeze the accumulated assignments.
    #[must_use]
    pub fn build(self) -> ConfigurationSet {
        debug!(properties = self.assignments.len(), "built configuration set");
        ConfigurationSet {
            assignments: self.assignments,
        }
    }

    fn resolve(&self, name: &str) -> ConfigResult<PropertyEntry> {
        self.catalog
            .lookup(name)
            .ok_or_else(|| ConfigError::PropertyNotFound {
                property: name.to_string(),
            })
    }

    fn resolve_or_placeholder(&self, name: &str) -> PropertyEntry {
        self.catalog.lookup(name).unwrap_or_else(|| {
            debug!(property = name, "unknown property recorded with placeholder entry");
            PropertyEntry::placeholder(name)
        })
    }

    fn assign(mut self, entry: PropertyEntry, value: TypedValue) -> Self {
        match self
            .assignments
            .iter_mut()
            .find(|(existing, _)| *existing == entry)
        {
            Some((_, slot)) => *slot = value,
            None => self.assignments.push((entry, value)),
        }
        self
    }
}

/// Parse a JSON object payload into the map accepted by
/// [`ConfigurationSetBuilder::with_json_map`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPropertyMap`] when the text is not valid JSON
/// or not an object.
pub fn parse_property_map(text: &str) -> ConfigResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ConfigError::InvalidPropertyMap { source: None }),
        Err(source) => Err(ConfigError::InvalidPropertyMap {
            source: Some(source),
        }),
    }
}

fn json_pairs(map: &Map<String, Value>) -> ConfigResult<Vec<(&str, Scalar)>> {
    map.iter()
        .map(|(name, value)| Ok((name.as_str(), Scalar::from_json(name, value)?)))
        .collect()
}

/// Immutable, ordered mapping from catalog entries to values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationSet {
    assignments: Vec<(PropertyEntry, TypedValue)>,
}

impl ConfigurationSet {
    /// Assignments in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PropertyEntry, &TypedValue)> {
        self.assignments.iter().map(|(entry, value)| (entry, value))
    }

    /// Value assigned to the setting called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.assignments
            .iter()
            .find(|(entry, _)| entry.name() == name)
            .map(|(_, value)| value)
    }

    /// Value assigned to exactly `entry`.
    #[must_use]
    pub fn get_entry(&self, entry: &PropertyEntry) -> Option<&TypedValue> {
        self.assignments
            .iter()
            .find(|(existing, _)| existing == entry)
            .map(|(_, value)| value)
    }

    /// Number of assignments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the set holds no assignments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Whether any assigned setting only takes effect after a restart.
    #[must_use]
    pub fn requires_restart(&self) -> bool {
        self.assignments
            .iter()
            .any(|(entry, _)| entry.needs_restart())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::property::DataType;
    use crate::unit::UnitGroup;

    fn catalog() -> HashMap<String, PropertyEntry> {
        [
            PropertyEntry::with_group("work_mem", false, DataType::Integer, UnitGroup::Bytes),
            PropertyEntry::with_group("max_connections", true, DataType::Integer, UnitGroup::None),
            PropertyEntry::with_group("fsync", false, DataType::Boolean, UnitGroup::None),
            PropertyEntry::with_group("wal_level", true, DataType::String, UnitGroup::None),
        ]
        .into_iter()
        .map(|entry| (entry.name().to_string(), entry))
        .collect()
    }

    #[test]
    fn strict_mode_rejects_unknown_names() {
        let catalog = catalog();
        let err = ConfigurationSetBuilder::new(&catalog)
            .with_property("nope", "1")
            .err()
            .expect("unknown property");
        assert!(matches!(err, ConfigError::PropertyNotFound { property } if property == "nope"));
    }

    #[test]
    fn overwrites_keep_first_position() {
        let catalog = catalog();
        let set = ConfigurationSetBuilder::new(&catalog)
            .with_property("work_mem", "4MB")
            .and_then(|builder| builder.with_property("fsync", "off"))
            .and_then(|builder| builder.with_property("work_mem", "8MB"))
            .expect("valid assignments")
            .build();

        let names: Vec<&str> = set.iter().map(|(entry, _)| entry.name()).collect();
        assert_eq!(names, ["work_mem", "fsync"]);
        assert_eq!(set.get("work_mem"), Some(&TypedValue::mb(8)));
        assert_eq!(set.len(), 2);
        assert!(!set.requires_restart());
    }

    #[test]
    fn typed_values_are_validated() {
        let catalog = catalog();
        let set = ConfigurationSetBuilder::new(&catalog)
            .with_value("max_connections", TypedValue::plain(200))
            .expect("valid")
            .build();
        assert!(set.requires_restart());

        let err = ConfigurationSetBuilder::new(&catalog)
            .with_value("work_mem", TypedValue::plain(5))
            .err()
            .expect("bytes need a unit");
        assert!(matches!(err, ConfigError::UnitNotAvailable { .. }));
    }

    #[test]
    fn unchecked_mode_uses_placeholders() {
        let catalog = catalog();
        let set = ConfigurationSetBuilder::new(&catalog)
            .with_property_unchecked("custom.flag", "yes")
            .with_property_unchecked("work_mem", "lots")
            .with_value_unchecked("fsync", TypedValue::plain(12))
            .build();

        let (entry, value) = set.iter().next().expect("first assignment");
        assert_eq!(entry, &PropertyEntry::placeholder("custom.flag"));
        assert_eq!(value, &TypedValue::plain("yes"));
        assert_eq!(set.get("work_mem"), Some(&TypedValue::plain("lots")));
        assert_eq!(set.get("fsync"), Some(&TypedValue::plain(12)));
        assert!(set.requires_restart());
    }

    #[test]
    fn bulk_operations_apply_in_order() {
        let catalog = catalog();
        let set = ConfigurationSetBuilder::new(&catalog)
            .with_properties([("fsync", "on"), ("work_mem", "1MB"), ("fsync", "off")])
            .expect("valid")
            .build();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("fsync"), Some(&TypedValue::plain(false)));

        let err = ConfigurationSetBuilder::new(&catalog)
            .with_properties([("fsync", "on"), ("work_mem", "1s")])
            .err()
            .expect("bad unit");
        assert!(matches!(err, ConfigError::UnitNotAvailable { .. }));
    }

    #[test]
    fn json_maps_preserve_document_order() {
        let catalog = catalog();
        let map = parse_property_map(r#"{"wal_level": "replica", "max_connections": 50, "fsync": true}"#)
            .expect("object");
        let set = ConfigurationSetBuilder::new(&catalog)
            .with_json_map(&map)
            .expect("valid")
            .build();
        let names: Vec<&str> = set.iter().map(|(entry, _)| entry.name()).collect();
        assert_eq!(names, ["wal_level", "max_connections", "fsync"]);

        let map = json!({"fsync": null});
        let err = ConfigurationSetBuilder::new(&catalog)
            .with_json_map(map.as_object().expect("object"))
            .err()
            .expect("null value");
        assert!(matches!(err, ConfigError::MissingValue { .. }));

        assert!(matches!(
            parse_property_map("[1, 2]"),
            Err(ConfigError::InvalidPropertyMap { source: None })
        ));
        assert!(matches!(
            parse_property_map("{"),
            Err(ConfigError::InvalidPropertyMap { source: Some(_) })
        ));
    }
}
