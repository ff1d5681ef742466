//! Error types for property parsing, validation and catalog loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::property::DataType;
use crate::unit::Unit;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Property name has no catalog entry.
    #[error("property '{property}' not found in catalog")]
    PropertyNotFound {
        /// Name that failed lookup.
        property: String,
    },
    /// Value type does not match the property's declared data type.
    #[error(
        "property '{property}' expects a value of type {expected} but got {actual} '{value}'"
    )]
    WrongType {
        /// Property being assigned.
        property: String,
        /// Declared data type of the property.
        expected: DataType,
        /// Type name of the offending value.
        actual: &'static str,
        /// Offending value as text.
        value: String,
    },
    /// Value carries a unit (or lacks one) the property does not accept.
    #[error("value '{value}' uses a unit not available for property '{property}' (accepted: {})", render_units(.available))]
    UnitNotAvailable {
        /// Property being assigned.
        property: String,
        /// Units the property accepts.
        available: Vec<Unit>,
        /// Offending value as text.
        value: String,
    },
    /// A value was absent where one is required.
    #[error("property '{property}' has no value")]
    MissingValue {
        /// Property that was left without a value.
        property: String,
    },
    /// Untyped input could not be mapped to a scalar.
    #[error("property '{property}' has an unsupported value '{value}'")]
    UnsupportedValue {
        /// Property being assigned.
        property: String,
        /// Rendered input value.
        value: String,
    },
    /// Catalog table line could not be parsed.
    #[error("invalid catalog line {line}")]
    InvalidCatalogLine {
        /// One-based line number in the catalog table.
        line: usize,
        /// Raw content of the line.
        content: String,
    },
    /// Property map was not a JSON object.
    #[error("property map must be a JSON object")]
    InvalidPropertyMap {
        /// Source JSON error when the payload failed to parse.
        #[source]
        source: Option<serde_json::Error>,
    },
    /// File system operation failed.
    #[error("catalog io failure")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn render_units(units: &[Unit]) -> String {
    let names: Vec<&str> = units.iter().map(|unit| unit.name()).collect();
    names.join(", ")
}
