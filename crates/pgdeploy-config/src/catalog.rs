//! Property catalog sources.
//!
//! # Design
//! - Lookup is a capability ([`PropertyCatalog`]) so file-backed tables, maps
//!   and closures can stand in for each other.
//! - The reference table holds one `name|unit-hint|type-tag[|context]` record per line.
//! - The unit hint resolves to the longest matching suffix of the unit table
//!   and then to the group containing it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::property::{DataType, PropertyEntry};
use crate::unit::Unit;

const BUNDLED_TABLE: &str = include_str!("../data/pgprops.csv");

/// Context of settings that only take effect after a restart.
const RESTART_CONTEXT: &str = "postmaster";

/// Resolves setting names to catalog entries.
pub trait PropertyCatalog {
    /// Entry for `name`, if the catalog knows it.
    fn lookup(&self, name: &str) -> Option<PropertyEntry>;
}

impl PropertyCatalog for HashMap<String, PropertyEntry> {
    fn lookup(&self, name: &str) -> Option<PropertyEntry> {
        self.get(name).cloned()
    }
}

impl<F> PropertyCatalog for F
where
    F: Fn(&str) -> Option<PropertyEntry>,
{
    fn lookup(&self, name: &str) -> Option<PropertyEntry> {
        self(name)
    }
}

/// Catalog backed by the delimiter-separated reference table.
#[derive(Debug, Clone, Default)]
pub struct TableCatalog {
    entries: HashMap<String, PropertyEntry>,
}

impl TableCatalog {
    /// Parse a reference table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCatalogLine`] when a record lacks the
    /// name, unit hint or type tag column.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let mut entries = HashMap::new();
        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let entry = parse_record(trimmed).ok_or_else(|| ConfigError::InvalidCatalogLine {
                line: index + 1,
                content: line.to_string(),
            })?;
            entries.insert(entry.name().to_string(), entry);
        }
        debug!(properties = entries.len(), "parsed property catalog");
        Ok(Self { entries })
    }

    /// Read and parse a reference table from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, or any error
    /// from [`TableCatalog::parse`].
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            operation: "catalog.read",
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Catalog shipped with the crate, covering the commonly tuned settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCatalogLine`] if the bundled table is malformed.
    pub fn bundled() -> ConfigResult<Self> {
        Self::parse(BUNDLED_TABLE)
    }

    /// Number of known settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Setting names in lexical order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PropertyCatalog for TableCatalog {
    fn lookup(&self, name: &str) -> Option<PropertyEntry> {
        self.entries.get(name).cloned()
    }
}

fn parse_record(record: &str) -> Option<PropertyEntry> {
    let mut columns = record.split('|').map(str::trim);
    let name = columns.next().filter(|name| !name.is_empty())?;
    let hint = columns.next()?;
    let tag = columns.next()?;
    let needs_restart = columns
        .next()
        .filter(|context| !context.is_empty())
        .is_none_or(|context| context == RESTART_CONTEXT);

    Some(PropertyEntry::with_group(
        name,
        needs_restart,
        DataType::from_tag(tag),
        hint_unit(hint).group(),
    ))
}

fn hint_unit(hint: &str) -> Unit {
    Unit::matching(hint)
        .max_by_key(|unit| unit.suffix().len())
        .unwrap_or(Unit::None)
}
