//! Catalog entries describing individual `postgresql.conf` settings.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::unit::{Unit, UnitGroup};

/// Data type of a setting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// `on`/`off` style flags.
    Boolean,
    /// 64-bit signed integers.
    Integer,
    /// 64-bit floating point numbers.
    Real,
    /// Free-form text, including enumerations.
    String,
}

impl DataType {
    /// Lowercase label used in catalogs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::String => "string",
        }
    }

    /// Map a catalog type tag onto a data type. Unknown tags are treated as text.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or(Self::String)
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "bool" | "boolean" => Ok(Self::Boolean),
            "integer" => Ok(Self::Integer),
            "real" => Ok(Self::Real),
            "string" | "enum" => Ok(Self::String),
            other => Err(format!("unknown data type '{other}'")),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Static metadata for one configuration key.
///
/// Equality covers every field, so two entries sharing a name but disagreeing
/// on type, units or restart requirement are distinct keys of a
/// [`ConfigurationSet`](crate::ConfigurationSet).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PropertyEntry {
    name: String,
    needs_restart: bool,
    data_type: DataType,
    units: Vec<Unit>,
}

impl PropertyEntry {
    /// Build an entry from its parts.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        needs_restart: bool,
        data_type: DataType,
        units: impl Into<Vec<Unit>>,
    ) -> Self {
        Self {
            name: name.into(),
            needs_restart,
            data_type,
            units: units.into(),
        }
    }

    /// Build an entry accepting every unit of `group`.
    #[must_use]
    pub fn with_group(
        name: impl Into<String>,
        needs_restart: bool,
        data_type: DataType,
        group: UnitGroup,
    ) -> Self {
        Self::new(name, needs_restart, data_type, group.units())
    }

    /// Entry used for names the catalog does not know, when callers opt out of validation.
    ///
    /// Placeholders require a restart, hold text and accept only unit-less values.
    #[must_use]
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::with_group(name, true, DataType::String, UnitGroup::None)
    }

    /// Setting name as written in `postgresql.conf`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether changing the setting requires a server restart.
    #[must_use]
    pub const fn needs_restart(&self) -> bool {
        self.needs_restart
    }

    /// Declared data type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Units the setting accepts.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Whether `unit` is accepted.
    #[must_use]
    pub fn accepts(&self, unit: Unit) -> bool {
        self.units.contains(&unit)
    }
}
